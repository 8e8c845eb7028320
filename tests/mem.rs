use memfs::*;

#[tokio::test]
async fn test_shared_basic_operations() -> FsResult<()> {
    let fs = SharedFs::new();

    fs.makedirs("/data", true).await?;
    fs.writefile("/data/hello.txt", b"Hello VFS!").await?;

    assert!(fs.isfile("/data/hello.txt").await);
    assert_eq!(fs.readfile("/data/hello.txt").await?, b"Hello VFS!");

    let stat = fs.stat("/data/hello.txt").await?;
    assert_eq!(stat.name, "hello.txt");
    assert_eq!(stat.size, 10);

    fs.remove("/data/hello.txt").await?;
    let result = fs.stat("/data/hello.txt").await;
    assert!(matches!(result, Err(FsError::NotFound(_))));

    fs.rmdir("/data").await?;
    assert!(fs.listdir("/").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_shared_walk_and_rename() -> FsResult<()> {
    let fs = SharedFs::new();

    fs.mkdir("/x").await?;
    fs.writefile("/x/y.txt", b"hi").await?;
    fs.rename("/x", "/z").await?;

    assert!(!fs.exists("/x").await);
    assert!(fs.isdir("/z").await);

    let entries = fs.walk("/").await?;
    assert_eq!(
        entries,
        vec![
            WalkEntry::new("/", vec!["z".into()], vec![]),
            WalkEntry::new("/z", vec![], vec!["y.txt".into()]),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_shared_handle_commits() -> FsResult<()> {
    let fs = SharedFs::new();

    {
        let mut handle = fs.open("/report.txt", OpenMode::Write).await?;
        handle.write_str("DATA PROCESSING REPORT\n")?;
        handle.write_str("Processed 4 records\n")?;
    }

    let mut handle = fs.open("/report.txt", "r".parse::<OpenMode>()?).await?;
    let lines: Vec<Vec<u8>> = handle.lines().collect::<FsResult<_>>()?;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], b"Processed 4 records\n");

    Ok(())
}

#[tokio::test]
async fn test_remove_waits_for_open_handle() -> FsResult<()> {
    let fs = SharedFs::new();
    fs.writefile("/a.txt", b"one").await?;

    let mut handle = fs.open("/a.txt", OpenMode::Write).await?;

    let other = fs.clone();
    let remover = tokio::spawn(async move { other.remove("/a.txt").await });

    handle.write_str("two")?;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    // The handle still holds the tree lock.
    assert!(!remover.is_finished());

    handle.close()?;
    drop(handle);

    remover.await.expect("remover task panicked")?;
    assert!(!fs.exists("/a.txt").await);

    Ok(())
}

#[tokio::test]
async fn test_read_handle_shares_lock() -> FsResult<()> {
    let fs = SharedFs::new();
    fs.writefile("/a.txt", b"shared").await?;

    let mut handle = fs.open("/a.txt", OpenMode::Read).await?;
    let mut second = fs.open("/a.txt", OpenMode::ReadBinary).await?;

    let other = fs.clone();
    let reader = tokio::spawn(async move { other.readfile("/a.txt").await });
    assert_eq!(reader.await.expect("reader task panicked")?, b"shared");
    assert!(fs.exists("/a.txt").await);
    assert_eq!(fs.listdir("/").await?, vec!["a.txt"]);

    assert_eq!(handle.read_to_string()?, "shared");
    assert_eq!(second.read(3)?, b"sha");

    Ok(())
}

#[tokio::test]
async fn test_remove_waits_for_read_handle() -> FsResult<()> {
    let fs = SharedFs::new();
    fs.writefile("/a.txt", b"one").await?;

    let handle = fs.open("/a.txt", OpenMode::Read).await?;

    let other = fs.clone();
    let remover = tokio::spawn(async move { other.remove("/a.txt").await });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!remover.is_finished());

    drop(handle);
    remover.await.expect("remover task panicked")?;
    assert!(!fs.exists("/a.txt").await);

    Ok(())
}

#[tokio::test]
async fn test_readers_see_committed_content_only() -> FsResult<()> {
    let fs = SharedFs::new();
    fs.writefile("/a.txt", b"before").await?;

    let mut handle = fs.open("/a.txt", OpenMode::Append).await?;
    handle.write_str(" after")?;

    let reader = fs.clone();
    let read = tokio::spawn(async move { reader.readfile("/a.txt").await });
    drop(handle);

    assert_eq!(read.await.expect("reader task panicked")?, b"before after");

    Ok(())
}

#[tokio::test]
async fn test_snapshot_json_round_trip() -> FsResult<()> {
    let fs = SharedFs::new();
    fs.makedirs("/config", true).await?;
    fs.makedirs("/output", true).await?;
    fs.writefile("/config/test.json", br#"{"name":"Test Config"}"#)
        .await?;

    let json = fs.snapshot().await.to_json()?;
    let snapshot = Snapshot::from_json(&json)?;
    assert_eq!(snapshot.entries["/output"], None);

    let restored = SharedFs::from_fs(MemoryFileSystem::from_snapshot(
        &snapshot,
        FsConfig::default(),
    )?);
    assert_eq!(
        restored.readfile("/config/test.json").await?,
        br#"{"name":"Test Config"}"#
    );
    assert!(restored.isdir("/output").await);

    Ok(())
}

#[tokio::test]
async fn test_batch_under_one_lock() -> FsResult<()> {
    let fs = SharedFs::with_config(FsConfig::default().with_max_nodes(8));

    {
        let mut tree = fs.lock().await;
        tree.makedirs("/data/raw", false)?;
        tree.writefile("/data/raw/input.csv", "id,name\n1,Alpha\n")?;
        tree.rename("/data/raw", "/data/processed")?;
    }

    let tree = fs.lock_shared().await;
    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.listdir("/data")?, vec!["processed"]);

    Ok(())
}

#[tokio::test]
async fn test_backend_as_trait_object() -> FsResult<()> {
    let backend: Box<dyn FsBackend> = Box::new(SharedFs::new());

    backend.mkdir("/a").await?;
    let result = backend.mkdir("/a").await;
    assert!(matches!(result, Err(FsError::AlreadyExists(_))));

    backend.writefile("/a/f.txt", b"x").await?;
    assert!(matches!(
        backend.remove("/a").await,
        Err(FsError::IsADirectory(_))
    ));
    assert!(matches!(
        backend.rmdir("/a").await,
        Err(FsError::DirectoryNotEmpty(_))
    ));

    Ok(())
}
