use app_creator_prelude::Template;
use app_creator_storage::{mongo, BackendConfig, Config, Error, RetryPolicy};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::GenericImage;

fn storage_config(port: u16, collection: &str) -> Config {
    Config {
        backend: BackendConfig::Mongo(mongo::Config {
            url: format!("mongodb://127.0.0.1:{port}/?serverSelectionTimeoutMS=2000"),
            database: "app-creator".into(),
            collection: collection.into(),
        }),
        retry: RetryPolicy::disabled(),
    }
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn should_store_and_list_templates() {
    let node = GenericImage::new("mongo", "7")
        .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
        .with_exposed_port(ContainerPort::Tcp(27017))
        .start()
        .await
        .unwrap();
    let port = node.get_host_port_ipv4(27017).await.unwrap();

    let storage = storage_config(port, "templates").build().await.unwrap();
    assert!(storage.list_all().await.unwrap().is_empty());

    let template = Template::new("left-side-panel", "Left Side Panel", "", "{}");
    storage.put(template.clone()).await.unwrap();
    assert_eq!(storage.list_all().await.unwrap(), vec![template.clone()]);

    let err = storage.put(template).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateId(ref id) if id == "left-side-panel"));
}

#[tokio::test]
async fn fails_unreachable_server() {
    // nothing listens on the discard port
    let storage = storage_config(9, "templates").build().await.unwrap();
    let err = storage.list_all().await.unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)), "{err:?}");
}
