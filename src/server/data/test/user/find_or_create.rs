use super::*;

/// Tests creating a user from an unknown email.
///
/// Expected: Ok with the email stored trimmed and lowercased
#[tokio::test]
async fn creates_user_with_normalized_email() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserRepository::new(db);
    let user = repo
        .find_or_create(" Nikos@Example.COM ", "Nikos".to_string(), None)
        .await?;

    assert_eq!(user.email, "nikos@example.com");
    assert_eq!(user.name, "Nikos");

    Ok(())
}

/// Tests looking up an existing user with a differently cased email.
///
/// Expected: Ok with the existing user, name and phone unchanged
#[tokio::test]
async fn reuses_existing_user_ignoring_case() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let existing = factory::user::UserFactory::new(db)
        .name("Maria")
        .email("maria@example.com")
        .phone("+30 690 0000000")
        .build()
        .await?;

    let repo = UserRepository::new(db);
    let user = repo
        .find_or_create("MARIA@example.com", "Someone Else".to_string(), None)
        .await?;

    assert_eq!(user.id, existing.id);
    assert_eq!(user.name, "Maria");
    assert_eq!(user.phone.as_deref(), Some("+30 690 0000000"));

    Ok(())
}
