use birthday_core::db::{open_db, open_db_in_memory};
use birthday_core::{
    BirthdayRecord, BirthdayRepository, BirthdayService, RepoError, ServiceError,
    SqliteBirthdayRepository,
};
use chrono::NaiveDate;
use std::sync::Barrier;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn insert_and_list_roundtrip_normalizes_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    repo.insert_birthday(&BirthdayRecord::new("Henrique  Jambu", 9, 6, "g"))
        .unwrap();

    let records = repo.list_group("g").unwrap();
    assert_eq!(records.len(), 1);
    let loaded = &records[0];
    assert_eq!(loaded.name, "henrique jambu");
    assert_eq!((loaded.day, loaded.month), (9, 6));
    assert_eq!(loaded.group_id, "g");
}

#[test]
fn duplicate_name_in_same_group_keeps_first_record() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("Henrique Jambu", 9, 6, "g").unwrap();
    let err = service.add("henrique jambu", 10, 6, "g").unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateName { ref name } if name == "henrique jambu"));

    let records = service.list("g").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!((records[0].day, records[0].month), (9, 6));
}

#[test]
fn same_name_is_allowed_in_different_groups() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("Ana", 1, 1, "a").unwrap();
    service.add("Ana", 2, 2, "b").unwrap();

    assert_eq!(service.list("a").unwrap().len(), 1);
    assert_eq!(service.list("b").unwrap()[0].day, 2);
}

#[test]
fn list_is_scoped_to_group() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("Ana", 1, 1, "a").unwrap();

    assert!(service.list("b").unwrap().is_empty());
}

#[test]
fn list_orders_by_month_then_day_then_name() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("Zeca", 5, 3, "g").unwrap();
    service.add("Bia", 20, 1, "g").unwrap();
    service.add("Ana", 5, 3, "g").unwrap();
    service.add("Caio", 31, 12, "g").unwrap();

    let names: Vec<String> = service
        .list("g")
        .unwrap()
        .into_iter()
        .map(|record| record.name)
        .collect();
    assert_eq!(names, vec!["bia", "ana", "zeca", "caio"]);
}

#[test]
fn remove_matches_full_name_ignoring_case() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("Ana Maria", 1, 1, "g").unwrap();

    assert!(matches!(
        service.remove("Ana", "g"),
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.remove("ANA MARIA", "other"),
        Err(ServiceError::NotFound { .. })
    ));
    service.remove("ANA   MARIA", "g").unwrap();
    assert!(service.list("g").unwrap().is_empty());
}

#[test]
fn delete_missing_record_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let err = repo.delete_birthday("Nobody", "g").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { ref name, .. } if name == "nobody"));
}

#[test]
fn insert_rejects_invalid_record_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let err = repo
        .insert_birthday(&BirthdayRecord::new("Ana", 30, 2, "g"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_group("g").unwrap().is_empty());
}

#[test]
fn find_on_date_spans_groups() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("Ana", 9, 6, "b").unwrap();
    service.add("Bia", 9, 6, "a").unwrap();
    service.add("Caio", 10, 6, "a").unwrap();

    let found = service.find_on_date(9, 6).unwrap();
    let keys: Vec<(&str, &str)> = found
        .iter()
        .map(|record| (record.group_id.as_str(), record.name.as_str()))
        .collect();
    assert_eq!(keys, vec![("a", "bia"), ("b", "ana")]);
}

#[test]
fn celebrating_on_common_year_february_28_includes_leap_day() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("Leap", 29, 2, "g").unwrap();
    service.add("Plain", 28, 2, "g").unwrap();

    assert_eq!(service.celebrating_on(date(2027, 2, 28)).unwrap().len(), 2);
    assert_eq!(service.celebrating_on(date(2028, 2, 28)).unwrap().len(), 1);
    assert_eq!(service.celebrating_on(date(2028, 2, 29)).unwrap().len(), 1);
}

#[test]
fn upcoming_orders_by_next_occurrence_across_year_end() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    service.add("New Year", 1, 1, "g").unwrap();
    service.add("Year End", 31, 12, "g").unwrap();

    let entries = service.upcoming("g", date(2026, 6, 15), 3).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].record.name, "year end");
    assert_eq!(entries[0].next_occurrence, date(2026, 12, 31));
    assert_eq!(entries[1].record.name, "new year");
    assert_eq!(entries[1].next_occurrence, date(2027, 1, 1));
}

#[test]
fn upcoming_counts_today_and_truncates_to_limit() {
    let conn = open_db_in_memory().unwrap();
    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());

    for (name, day, month) in [("A", 14, 6), ("B", 15, 6), ("C", 16, 6), ("D", 17, 6), ("E", 1, 7)] {
        service.add(name, day, month, "g").unwrap();
    }

    let entries = service.upcoming("g", date(2026, 6, 15), 3).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.record.name.as_str()).collect();
    assert_eq!(names, vec!["b", "c", "d"]);
    assert_eq!(entries[0].days_until, 0);
    assert_eq!(entries[2].days_until, 2);
}

#[test]
fn concurrent_adds_of_same_person_allow_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    drop(open_db(&path).unwrap());

    let barrier = Barrier::new(4);
    let outcomes: Vec<Result<(), ServiceError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let path = path.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    let conn = open_db(&path).unwrap();
                    let service =
                        BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());
                    barrier.wait();
                    service.add("Ana", i + 1, 1, "g").map(|_| ())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .all(|err| matches!(err, ServiceError::DuplicateName { .. })));
}
