use projex::ProjectDb;
use projex::ProjectRepository;

#[tokio::test]
async fn test_simple() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("test.db");
    let store: ProjectDb = ProjectDb::new(&path).await?;

    let projects = store.load().await?;
    assert_eq!(projects.len(), 0);

    Ok(())
}
