use super::*;

fn bond(id: &str) -> Bond {
    Bond {
        id: id.to_owned(),
        name: format!("Farm {id}"),
        lat: 12.97,
        lon: 77.59,
        capacity_kw: 100.0,
        threshold: 75.0,
        interest_rate: None,
        contract_address: None,
    }
}

#[test]
fn registry_default_is_empty() {
    let state = RegistryState::default();
    assert!(state.is_empty());
    assert_eq!(state.len(), 0);
}

#[test]
fn replace_discards_previous_bonds() {
    let mut state = RegistryState::default();
    state.replace(vec![bond("a"), bond("b")]);
    state.replace(vec![bond("c")]);
    assert_eq!(state.len(), 1);
    assert!(state.find("a").is_none());
    assert_eq!(state.find("c").map(|b| b.name.as_str()), Some("Farm c"));
}

#[test]
fn resolve_accepts_id_or_position() {
    let mut state = RegistryState::default();
    state.replace(vec![bond("abc123"), bond("def456")]);
    assert_eq!(state.resolve("def456").map(|b| b.id.as_str()), Some("def456"));
    assert_eq!(state.resolve("1").map(|b| b.id.as_str()), Some("abc123"));
    assert_eq!(state.resolve("2").map(|b| b.id.as_str()), Some("def456"));
    assert!(state.resolve("0").is_none());
    assert!(state.resolve("3").is_none());
    assert!(state.resolve("nope").is_none());
}

#[test]
fn resolve_prefers_exact_id_over_position() {
    let mut state = RegistryState::default();
    state.replace(vec![bond("2"), bond("x")]);
    assert_eq!(state.resolve("2").map(|b| b.id.as_str()), Some("2"));
}

#[test]
fn clear_empties_registry() {
    let mut state = RegistryState::default();
    state.replace(vec![bond("a")]);
    state.clear();
    assert!(state.is_empty());
}
