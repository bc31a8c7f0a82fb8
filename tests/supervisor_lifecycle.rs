//! End-to-end supervisor runs against a scripted server.

#![cfg(unix)]

mod common;

use std::time::Duration;

use common::{free_port, ServerRoot, FAKE_SERVER};
use mcsm::config::schema::ServerProfile;
use mcsm::server::{Phase, Supervisor, SupervisorError};
use mcsm::Settings;

const RUN_TIMEOUT: Duration = Duration::from_secs(20);

async fn supervisor(root: &ServerRoot, settings: &str) -> Supervisor {
    let settings = Settings::parse(settings).unwrap();
    Supervisor::new(&ServerProfile::default(), root.path(), settings, root.logger.clone())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_bootstrap_then_run() {
    let root = ServerRoot::new();
    let port = free_port().await;
    let (command, _script) = root.script_command(FAKE_SERVER);

    let mut supervisor = supervisor(
        &root,
        &format!("server-ip=127.0.0.1\nserver-port={}\nallocated_ram=4096\n", port),
    )
    .await
    .with_command(command);
    let allocated = supervisor.endpoint().port;

    let status = tokio::time::timeout(RUN_TIMEOUT, supervisor.run())
        .await
        .expect("supervisor should finish")
        .unwrap();

    assert_eq!(supervisor.phase(), Phase::Terminated);
    assert!(status.map(|s| s.success()).unwrap_or(false));

    assert_eq!(root.read("eula.txt"), "a=1\neula=true");
    let properties = root.read("server.properties");
    assert!(properties.contains(&format!("server-port={}\n", allocated)));
    assert!(properties.contains("motd=hello\n"));

    let log = root.log();
    assert!(!log.contains("Failed to load eula.txt"), "phase 1 output must not be relayed");
    assert!(!log.contains("Loading properties"));
    assert!(log.contains("[MCSM/SERVER/INFO] Preparing world"));
    assert!(log.contains("Agreed to Mojang's EULA."));
    assert!(log.contains("[MCSM/SERVER] Starting Server..."));
    assert_eq!(log.matches("] Done!").count(), 1);
    assert!(log.contains("[MCSM/SERVER/WARN] Can't keep up!"));
    assert!(log.contains("[MCSM/SERVER] Server stopped."));
    assert!(!log.contains("The allocated ram is set to"));
}

#[tokio::test]
async fn test_existing_files_skip_bootstrap() {
    let root = ServerRoot::new();
    root.write("eula.txt", "eula=true\n");
    root.write("server.properties", "server-port=25565\nmotd=hello\n");
    let (command, _script) = root.script_command(FAKE_SERVER);

    let mut supervisor = supervisor(&root, "server-ip=127.0.0.1\nserver-port=0\nallocated_ram=2048\n")
        .await
        .with_command(command);

    tokio::time::timeout(RUN_TIMEOUT, supervisor.run())
        .await
        .expect("supervisor should finish")
        .unwrap();

    assert_eq!(root.read("eula.txt"), "eula=true\n");
    assert_eq!(root.read("server.properties"), "server-port=0\nmotd=hello\n");

    let log = root.log();
    assert!(!log.contains("Initializing Server..."));
    assert!(log.contains("[MCSM/WARN] The allocated ram is set to 2048MB."));
    assert!(log.contains("] Done!"));
}

#[tokio::test]
async fn test_missing_sentinel_is_integrity_failure() {
    let root = ServerRoot::new();
    root.write("eula.txt", "eula=true");
    let (command, _script) =
        root.script_command("echo '[12:00:00] [main/INFO]: Starting'\nexit 0\n");

    let mut supervisor = supervisor(&root, "server-ip=127.0.0.1\nserver-port=0\n")
        .await
        .with_command(command);

    let result = tokio::time::timeout(RUN_TIMEOUT, supervisor.run())
        .await
        .expect("supervisor should finish");

    match result {
        Err(SupervisorError::BootstrapIntegrity { phase, .. }) => {
            assert_eq!(phase, Phase::BootstrapProperties)
        }
        other => panic!("expected BootstrapIntegrity, got {:?}", other),
    }
    assert!(root.log().contains("[MCSM/SERVER/INFO] Starting"));
}

#[tokio::test]
async fn test_missing_license_file_is_integrity_failure() {
    let root = ServerRoot::new();
    let (command, _script) = root.script_command("echo 'no license here'\nexit 1\n");

    let mut supervisor = supervisor(&root, "server-ip=127.0.0.1\nserver-port=0\n")
        .await
        .with_command(command);

    let result = tokio::time::timeout(RUN_TIMEOUT, supervisor.run())
        .await
        .expect("supervisor should finish");

    match result {
        Err(SupervisorError::BootstrapIntegrity { phase, .. }) => {
            assert_eq!(phase, Phase::BootstrapEula)
        }
        other => panic!("expected BootstrapIntegrity, got {:?}", other),
    }
    assert_eq!(supervisor.phase(), Phase::BootstrapEula);
}

#[tokio::test]
async fn test_spawn_failure() {
    let root = ServerRoot::new();
    let mut supervisor = supervisor(&root, "server-ip=127.0.0.1\nserver-port=0\n")
        .await
        .with_command(mcsm::server::ServerCommand {
            program: "/definitely/not/a/java".into(),
            args: Vec::new(),
        });

    let result = supervisor.run().await;
    assert!(matches!(result, Err(SupervisorError::Spawn { .. })));
}
