use super::*;

/// Tests rewriting column positions in a new order.
///
/// Expected: Ok with `get_all` returning columns in the new order at positions 0..n
#[tokio::test]
async fn reorders_columns() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let [todo, in_progress, done] = factory::create_default_columns(db, member.tenant.id).await?;

    let repo = StatusRepository::new(db);
    repo.set_positions(&[done.id, todo.id, in_progress.id]).await?;

    let columns = repo.get_all(member.tenant.id).await?;
    let ids: Vec<i32> = columns.iter().map(|c| c.id).collect();
    let positions: Vec<i32> = columns.iter().map(|c| c.position).collect();
    assert_eq!(ids, vec![done.id, todo.id, in_progress.id]);
    assert_eq!(positions, vec![0, 1, 2]);

    Ok(())
}
