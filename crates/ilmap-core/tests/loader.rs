//! Tests for the debug-info loader

mod common;

use std::sync::Arc;
use std::thread;

use common::{sp, FakeModule, ImageMemory, LoadRequest, RecordingHost};
use ilmap_core::error::IlmapError;
use ilmap_core::modules::{DebugInfoLoader, LoadAll, ModuleRegistry, PrefixPolicy, SymbolStatus};
use ilmap_core::symbols::{ImageLayout, MethodTable, TableHost, TableSymbols};
use ilmap_core::types::{Address, MethodToken};
use ilmap_utils::SymbolSettings;

const APP: &str = "/app/App.dll";

fn user_method() -> MethodToken
{
    MethodToken::method_def(1)
}

fn hidden_method() -> MethodToken
{
    MethodToken::method_def(2)
}

fn app_symbols() -> TableSymbols
{
    TableSymbols::new()
        .with_method(user_method(), MethodTable::new(0x20).point(sp(0, 10, "/src/Program.cs")))
        .with_method(
            hidden_method(),
            MethodTable::new(0x08).point(sp(0, 30, "/src/Program.cs")).non_user_code(),
        )
}

fn recording_host() -> Arc<RecordingHost>
{
    Arc::new(RecordingHost::new(TableHost::new().with_file(APP, app_symbols())))
}

#[test]
fn test_load_registers_module_with_symbols()
{
    let host = recording_host();
    let loader = DebugInfoLoader::new(host.clone(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();

    let module = Arc::new(FakeModule::new(APP, 0x7f00_0000));
    let descriptor = loader.load(module.clone(), &registry).unwrap();

    assert_eq!(descriptor.name, "App.dll");
    assert_eq!(descriptor.path, APP);
    assert_eq!(descriptor.symbol_status, SymbolStatus::Loaded);
    assert_eq!(descriptor.base_address, Address::new(0x7f00_0000));
    assert_eq!(descriptor.size, 0x1000);
    assert_eq!(descriptor.id.to_string(), "d437908e-65e6-487c-9735-7bdff699bea5");

    assert_eq!(host.requests(), vec![LoadRequest::File(APP.to_string())]);
    assert!(registry.find_by_address(Address::new(0x7f00_0000)).unwrap().has_symbols);
}

#[test]
fn test_jmc_configured_for_loaded_module()
{
    let loader = DebugInfoLoader::new(recording_host(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();
    let module = Arc::new(FakeModule::new(APP, 0x1000));

    loader.load(module.clone(), &registry).unwrap();

    assert_eq!(module.jmc_status(), Some(true));
    assert_eq!(module.method_jmc_calls(), vec![(hidden_method(), false)]);
}

#[test]
fn test_jmc_disabled_by_configuration()
{
    let loader = DebugInfoLoader::new(recording_host(), Arc::new(LoadAll)).with_just_my_code(false);
    let registry = ModuleRegistry::new();
    let module = Arc::new(FakeModule::new(APP, 0x1000));

    let descriptor = loader.load(module.clone(), &registry).unwrap();

    assert_eq!(descriptor.symbol_status, SymbolStatus::Loaded);
    assert_eq!(module.jmc_status(), Some(false));
    assert!(module.method_jmc_calls().is_empty());
}

#[test]
fn test_policy_skip_never_calls_host()
{
    let host = recording_host();
    let loader = DebugInfoLoader::new(host.clone(), Arc::new(PrefixPolicy::default()));
    let registry = ModuleRegistry::new();
    let module = Arc::new(FakeModule::new("/dotnet/System.Runtime.dll", 0x2000));

    let descriptor = loader.load(module.clone(), &registry).unwrap();

    assert_eq!(descriptor.symbol_status, SymbolStatus::Skipped);
    assert!(host.requests().is_empty());
    assert_eq!(module.jmc_status(), Some(false));
    assert!(matches!(
        registry.resolve_in_module(Address::new(0x2000), "Program.cs", 10),
        Err(IlmapError::NoSymbols(_))
    ));
}

#[test]
fn test_missing_symbols_still_register()
{
    let host = recording_host();
    let loader = DebugInfoLoader::new(host.clone(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();
    let module = Arc::new(FakeModule::new("/app/Library.dll", 0x3000));

    let descriptor = loader.load(module.clone(), &registry).unwrap();

    assert_eq!(descriptor.symbol_status, SymbolStatus::NotFound);
    assert_eq!(host.requests().len(), 1);
    assert_eq!(module.jmc_status(), Some(false));
    assert!(!registry.find_by_address(Address::new(0x3000)).unwrap().has_symbols);
}

#[test]
fn test_dynamic_module_is_not_loaded()
{
    let host = recording_host();
    let loader = DebugInfoLoader::new(host.clone(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();

    let descriptor = loader
        .load(Arc::new(FakeModule::new("Emitted", 0x4000).dynamic()), &registry)
        .unwrap();

    assert_eq!(descriptor.symbol_status, SymbolStatus::NotFound);
    assert!(host.requests().is_empty());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_in_memory_module_loads_by_address()
{
    let host = Arc::new(RecordingHost::new(
        TableHost::new().with_in_memory(Address::new(0x5000), app_symbols()),
    ));
    let memory = ImageMemory {
        base: Address::new(0x5000),
        bytes: b"MZ\x90\x00".to_vec(),
    };
    let loader = DebugInfoLoader::new(host.clone(), Arc::new(LoadAll)).with_memory_reader(Arc::new(memory));
    let registry = ModuleRegistry::new();

    let descriptor = loader
        .load(Arc::new(FakeModule::new("Plugin.dll", 0x5000).in_memory()), &registry)
        .unwrap();

    assert_eq!(descriptor.symbol_status, SymbolStatus::Loaded);
    assert_eq!(
        host.requests(),
        vec![LoadRequest::InMemory {
            base: Address::new(0x5000),
            size: 0x1000,
            layout: ImageLayout::File,
            header: Some(b"MZ".to_vec()),
        }]
    );
}

#[test]
fn test_proc_self_paths_are_rewritten()
{
    let loader = DebugInfoLoader::new(recording_host(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();

    let descriptor = loader
        .load(Arc::new(FakeModule::new("/proc/self/fd/7", 0x6000)), &registry)
        .unwrap();

    assert_eq!(descriptor.path, "/proc/4242/fd/7");
    assert_eq!(descriptor.name, "7");
}

#[test]
fn test_malformed_metadata_is_not_registered()
{
    let loader = DebugInfoLoader::new(recording_host(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();

    let result = loader.load(Arc::new(FakeModule::new(APP, 0x7000).broken_metadata()), &registry);

    assert!(matches!(result, Err(IlmapError::MalformedMetadata(_))));
    assert!(registry.is_empty());
}

#[test]
fn test_second_module_at_same_address_is_rejected()
{
    let loader = DebugInfoLoader::new(recording_host(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();

    loader.load(Arc::new(FakeModule::new(APP, 0x8000)), &registry).unwrap();
    let again = loader.load(Arc::new(FakeModule::new("/app/Other.dll", 0x8000)), &registry);

    assert!(matches!(again, Err(IlmapError::InvalidArgument(_))));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_settings_drive_policy_and_jmc()
{
    let settings = SymbolSettings {
        skip_prefixes: vec!["Vendor.".to_string()],
        just_my_code: false,
    };
    let loader = DebugInfoLoader::from_settings(recording_host(), &settings);
    let registry = ModuleRegistry::new();
    assert!(!loader.just_my_code());

    let vendor = loader
        .load(Arc::new(FakeModule::new("/app/Vendor.Charts.dll", 0x1000)), &registry)
        .unwrap();
    let framework = loader
        .load(Arc::new(FakeModule::new("/dotnet/System.Linq.dll", 0x2000)), &registry)
        .unwrap();

    assert_eq!(vendor.symbol_status, SymbolStatus::Skipped);
    assert_eq!(framework.symbol_status, SymbolStatus::NotFound);
}

#[test]
fn test_concurrent_loads_all_register()
{
    let loader = DebugInfoLoader::new(recording_host(), Arc::new(LoadAll));
    let registry = ModuleRegistry::new();

    thread::scope(|scope| {
        for i in 0..8_u64 {
            let loader = &loader;
            let registry = &registry;
            scope.spawn(move || {
                let module = Arc::new(FakeModule::new(&format!("/app/Module{i}.dll"), 0x10_0000 * (i + 1)));
                loader.load(module, registry).unwrap();
            });
        }
    });

    assert_eq!(registry.len(), 8);
    for i in 0..8_u64 {
        assert!(registry.find_by_name(&format!("Module{i}.dll")).is_ok());
    }
}
