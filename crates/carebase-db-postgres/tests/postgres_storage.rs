//! Repository tests against a live PostgreSQL database.
//!
//! Set `CAREBASE_TEST_DATABASE_URL` to run them; they are skipped otherwise.
//! Every run uses fresh names so the database does not need to be empty.

use carebase_auth::{HospitalStorage, StaffStorage};
use carebase_core::{Gender, Hospital, NewHospital, NewPatient, NewStaff};
use carebase_db_postgres::{PostgresConfig, PostgresStorage, test_connection};
use carebase_search::{PatientFilter, PatientLookup, PatientSearch, PatientStorage};
use time::macros::date;

async fn connect() -> Option<PostgresStorage> {
    let Ok(url) = std::env::var("CAREBASE_TEST_DATABASE_URL") else {
        eprintln!("CAREBASE_TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let config = PostgresConfig::new(url)
        .with_pool_size(2)
        .with_run_migrations(true);
    let storage = PostgresStorage::new(&config)
        .await
        .expect("Failed to connect to test database");
    test_connection(storage.pool())
        .await
        .expect("Database round trip failed");
    Some(storage)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

async fn create_hospital(storage: &PostgresStorage) -> Hospital {
    HospitalStorage::create(storage, NewHospital::new(unique("hospital")))
        .await
        .expect("create hospital")
}

#[tokio::test]
async fn lookup_prefers_national_id_over_passport_id() {
    let Some(storage) = connect().await else {
        return;
    };
    let hospital = create_hospital(&storage).await;
    let other = create_hospital(&storage).await;
    let identifier = unique("ID");
    let dob = date!(1980 - 01 - 01);

    // Inserted first, so it has the lower id
    let by_passport = PatientStorage::create(
        &storage,
        NewPatient::new(hospital.id, unique("HN"), dob, Gender::Male).passport_id(&identifier),
    )
    .await
    .expect("create passport patient");
    let by_national = PatientStorage::create(
        &storage,
        NewPatient::new(hospital.id, unique("HN"), dob, Gender::Female).national_id(&identifier),
    )
    .await
    .expect("create national patient");
    assert!(by_passport.id < by_national.id);

    let found = storage
        .lookup(&PatientLookup::new(hospital.id, identifier.clone()))
        .await
        .expect("lookup")
        .expect("patient found");
    assert_eq!(found.id, by_national.id);

    let foreign = storage
        .lookup(&PatientLookup::new(other.id, identifier))
        .await
        .expect("lookup");
    assert!(foreign.is_none());
}

#[tokio::test]
async fn search_is_scoped_to_one_hospital() {
    let Some(storage) = connect().await else {
        return;
    };
    let first = create_hospital(&storage).await;
    let second = create_hospital(&storage).await;
    let last_name = unique("Jaidee");
    let dob = date!(1990 - 05 - 17);

    let ours = PatientStorage::create(
        &storage,
        NewPatient::new(first.id, unique("HN"), dob, Gender::Female).name_en("Somsri", &last_name),
    )
    .await
    .expect("create patient");
    PatientStorage::create(
        &storage,
        NewPatient::new(second.id, unique("HN"), dob, Gender::Female).name_en("Somsri", &last_name),
    )
    .await
    .expect("create patient");

    let search = PatientSearch::new(first.id)
        .with(PatientFilter::LastName, &last_name)
        .expect("valid filter");
    let found = storage.search(&search).await.expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, ours.id);
    assert_eq!(found[0].last_name_en.as_deref(), Some(last_name.as_str()));

    let by_date = PatientSearch::new(first.id)
        .with(PatientFilter::DateOfBirth, "1990-05-17")
        .expect("valid date");
    let found = storage.search(&by_date).await.expect("search");
    assert!(found.iter().all(|p| p.hospital_id == first.id));
    assert!(found.iter().any(|p| p.id == ours.id));
}

#[tokio::test]
async fn duplicates_map_to_already_exists() {
    let Some(storage) = connect().await else {
        return;
    };
    let hospital = create_hospital(&storage).await;
    let other = create_hospital(&storage).await;

    let err = HospitalStorage::create(&storage, NewHospital::new(hospital.name.clone()))
        .await
        .expect_err("duplicate hospital name");
    assert!(err.is_already_exists(), "{err}");

    let staff = |hospital_id| NewStaff {
        username: "nurse".into(),
        password_hash: "$argon2id$placeholder".into(),
        hospital_id,
    };
    StaffStorage::create(&storage, staff(hospital.id))
        .await
        .expect("create staff");
    let err = StaffStorage::create(&storage, staff(hospital.id))
        .await
        .expect_err("duplicate username in one hospital");
    assert!(err.is_already_exists(), "{err}");

    // Same username in another hospital is a different account
    let elsewhere = StaffStorage::create(&storage, staff(other.id))
        .await
        .expect("create staff in other hospital");
    let found = storage
        .find_by_username(other.id, "nurse")
        .await
        .expect("find staff")
        .expect("staff exists");
    assert_eq!(found.id, elsewhere.id);

    let hn = unique("HN");
    let dob = date!(1975 - 12 - 31);
    PatientStorage::create(&storage, NewPatient::new(hospital.id, hn.clone(), dob, Gender::Male))
        .await
        .expect("create patient");
    let err = PatientStorage::create(&storage, NewPatient::new(other.id, hn, dob, Gender::Male))
        .await
        .expect_err("duplicate patient_hn");
    assert!(err.is_already_exists(), "{err}");
}
