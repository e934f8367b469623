use std::path::Path;

#[test]
fn demos_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
    let demos = ["ammonia_to_power.yaml"];

    for name in demos {
        let path = root.join(name);
        let project = es_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        es_project::validate_project(&project)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
        assert!(!project.conversions.is_empty());
    }
}

#[test]
fn demo_components_build() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/ammonia_to_power.yaml");
    let project = es_project::load_yaml(&path).unwrap();

    let pem = es_project::build_conversion(&project, "pem", 1.0).unwrap();
    assert_eq!(pem.state().heatup, 1.0);
    assert!((pem.state().p_out - 1000.0).abs() < 1e-9);
    assert_eq!(pem.par().carriers().out.name, "Hydrogen");

    let sofc = es_project::build_conversion(&project, "sofc", 1.0).unwrap();
    assert_eq!(sofc.state().heatup, 0.0);

    let battery = es_project::build_storage(&project, "battery", 60.0).unwrap();
    assert_eq!(battery.state().soc, 1.0);
    assert_eq!(battery.par().carriers().in_mc.name, "Electricity");

    assert!(matches!(
        es_project::build_conversion(&project, "nope", 1.0),
        Err(es_project::ProjectError::NotFound { .. })
    ));
}
