//! Storage backend and model loader tests

use cwmp_data_model::{MemoryStorageBackend, ModelLoader, StorageError};

const TR181_XML: &str = include_str!("../schemas/tr-181-2-core.xml");

const VENDOR_XML: &str = r#"<dm:document xmlns:dm="urn:broadband-forum-org:cwmp:datamodel-1-8">
  <model name="Device:2.12" base="Device:2.11">
    <object name="Device.X_ACME_Led." access="readOnly" minEntries="1" maxEntries="1">
      <parameter name="Brightness" access="readWrite">
        <syntax><unsignedInt><range maxInclusive="100"/></unsignedInt></syntax>
      </parameter>
    </object>
  </model>
</dm:document>"#;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

mod memory_tests {
    use super::*;

    #[test]
    fn test_loader_orders_dependent_documents() {
        let rt = runtime();
        rt.block_on(async {
            // "a-vendor.xml" sorts before the file holding its base model
            let storage = MemoryStorageBackend::new()
                .with_file("schemas/a-vendor.xml", VENDOR_XML)
                .with_file("schemas/tr-181.xml", TR181_XML)
                .with_file("schemas/notes.txt", "ignored");
            let result = ModelLoader::new(storage).load_models("schemas").await.unwrap();

            assert!(result.failures.is_empty(), "{:?}", result.failures);
            let paths: Vec<_> = result.files.iter().map(|f| f.path.as_str()).collect();
            assert_eq!(paths, vec!["schemas/tr-181.xml", "schemas/a-vendor.xml"]);
            let vendor = result.model("Device:2.12").unwrap();
            assert!(vendor.object("Device.X_ACME_Led.").is_some());
            assert!(vendor.object("Device.DeviceInfo.").is_some());
        });
    }

    #[test]
    fn test_missing_base_is_a_failure() {
        let rt = runtime();
        rt.block_on(async {
            let storage = MemoryStorageBackend::new()
                .with_file("schemas/vendor.xml", VENDOR_XML)
                .with_file("schemas/broken.yaml", "name: [");
            let result = ModelLoader::new(storage).load_models("schemas").await.unwrap();

            assert!(result.models.is_empty());
            let failed: Vec<_> = result.failures.iter().map(|f| f.path.as_str()).collect();
            assert_eq!(failed, vec!["schemas/broken.yaml", "schemas/vendor.xml"]);
            assert!(result.failures[1].error.contains("Device:2.11"));
        });
    }

    #[test]
    fn test_digest_tracks_content() {
        let rt = runtime();
        rt.block_on(async {
            let load = |content: &'static str| async move {
                let storage = MemoryStorageBackend::new().with_file("m/tr-181.xml", content);
                ModelLoader::new(storage).load_models("m").await.unwrap()
            };
            let first = load(TR181_XML).await;
            let again = load(TR181_XML).await;
            assert_eq!(first.files[0].digest, again.files[0].digest);
            assert_eq!(first.files[0].digest.len(), 64);
        });
    }

    #[test]
    fn test_unknown_directory() {
        let rt = runtime();
        rt.block_on(async {
            let loader = ModelLoader::new(MemoryStorageBackend::new());
            assert!(matches!(
                loader.load_models("nowhere").await,
                Err(StorageError::DirectoryNotFound(_))
            ));
        });
    }
}

#[cfg(feature = "native-fs")]
mod filesystem_tests {
    use super::*;
    use cwmp_data_model::{
        DeviceTree, FileSystemStorageBackend, ModelFormat, ModelSaver, ParameterValueStruct, StorageBackend,
        ValidationConfig, bundled_model,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_every_format() {
        let temp = TempDir::new().unwrap();
        let rt = runtime();
        rt.block_on(async {
            let model = bundled_model("tr-098").unwrap();
            let saver = ModelSaver::new(FileSystemStorageBackend::new(temp.path()));
            let mut written = Vec::new();
            for format in [ModelFormat::Xml, ModelFormat::Yaml, ModelFormat::Json] {
                let dir = format!("out-{}", format.extension());
                written.push(saver.save_model(&dir, &model, format).await.unwrap());
            }
            assert_eq!(written[1], "out-yaml/InternetGatewayDevice_1.14.yaml");

            let loader = ModelLoader::new(saver.into_storage());
            for format in [ModelFormat::Xml, ModelFormat::Yaml, ModelFormat::Json] {
                let dir = format!("out-{}", format.extension());
                let result = loader.load_models(&dir).await.unwrap();
                assert!(result.failures.is_empty(), "{}: {:?}", format, result.failures);
                let loaded = result.model("InternetGatewayDevice:1.14").unwrap();
                assert_eq!(loaded.objects, model.objects, "{}", format);
            }
        });
        assert!(temp.path().join("out-xml").join("InternetGatewayDevice_1.14.xml").exists());
    }

    #[test]
    fn test_tree_survives_restart() {
        let temp = TempDir::new().unwrap();
        let rt = runtime();
        let model = Arc::new(bundled_model("tr-181").unwrap());

        let mut tree = DeviceTree::new(Arc::clone(&model), ValidationConfig::default()).unwrap();
        tree.add_object("Device.IP.Interface.", "").unwrap();
        tree.set_parameter_values(
            &[ParameterValueStruct::new("Device.IP.Interface.1.Name", "eth0")],
            "persist",
        )
        .unwrap();

        rt.block_on(async {
            let saver = ModelSaver::new(FileSystemStorageBackend::new(temp.path()));
            saver.save_snapshot("state/device.yaml", &tree.snapshot()).await.unwrap();

            let loader = ModelLoader::new(saver.into_storage());
            let restored = loader
                .load_tree("state/device.yaml", Arc::clone(&model), ValidationConfig::default())
                .await
                .unwrap();
            assert_eq!(restored.parameter_key(), "persist");
            assert_eq!(restored.value("Device.IP.Interface.1.Name").unwrap().to_string(), "eth0");

            let err = loader
                .load_tree("state/missing.yaml", model, ValidationConfig::default())
                .await
                .unwrap_err();
            assert!(err.to_string().contains("state/missing.yaml"));
        });
    }

    #[test]
    fn test_escape_attempts_rejected() {
        let temp = TempDir::new().unwrap();
        let rt = runtime();
        rt.block_on(async {
            let backend = FileSystemStorageBackend::new(temp.path());
            assert!(matches!(
                backend.write_file("../outside.yaml", b"x").await,
                Err(StorageError::PermissionDenied(_))
            ));
            assert!(matches!(
                ModelLoader::new(backend).load_models("../").await,
                Err(StorageError::PermissionDenied(_))
            ));
        });
    }
}
