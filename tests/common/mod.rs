use presto_client::{Connection, ConnectionBuilder, IsolationLevel};

use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

pub const PRESTO_IMAGE: &str = "prestodb/presto";
pub const PRESTO_TAG: &str = "0.292";
const PRESTO_PORT: u16 = 8080;

/// A running coordinator; stopped when dropped.
pub struct Presto {
    _container: ContainerAsync<GenericImage>,
    host: String,
    port: u16,
}

impl Presto {
    pub fn builder(&self) -> ConnectionBuilder {
        Connection::builder(&self.host)
            .port(self.port)
            .user("test")
            .source("test")
            .max_attempts(1)
    }

    pub fn connection(&self) -> Connection {
        self.builder().build().expect("Failed to configure connection")
    }

    pub fn connection_with_transaction(&self) -> Connection {
        self.builder()
            .isolation_level(IsolationLevel::ReadUncommitted)
            .build()
            .expect("Failed to configure connection")
    }
}

/// Test fixture starting a single-node Presto server in Docker.
pub async fn setup_presto() -> Presto {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let container = GenericImage::new(PRESTO_IMAGE, PRESTO_TAG)
        .with_exposed_port(PRESTO_PORT.tcp())
        .with_wait_for(WaitFor::message_on_either_std("SERVER STARTED"))
        .start()
        .await
        .expect("Failed to start Presto container");

    let host = container.get_host().await.expect("Failed to resolve container host").to_string();
    let port = container
        .get_host_port_ipv4(PRESTO_PORT.tcp())
        .await
        .expect("Failed to resolve Presto port");

    Presto { _container: container, host, port }
}
