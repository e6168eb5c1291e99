use keyward_license::{hash_machine_id, DeviceIdentity, FixedIdentity, MachineIdentity};

#[test]
fn fixed_identity_returns_its_id() {
    let identity = FixedIdentity::new("device-42");
    assert_eq!(identity.device_id().unwrap(), "device-42");
}

#[test]
fn machine_identity_is_stable() {
    // Hosts without a machine id report an identity error instead.
    match (MachineIdentity.device_id(), MachineIdentity.device_id()) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a, b);
            assert_eq!(a.len(), 64);
        }
        (Err(a), Err(b)) => assert_eq!(a.kind(), b.kind()),
        _ => panic!("machine identity changed between calls"),
    }
}

#[test]
fn machine_id_hash_is_deterministic() {
    assert_eq!(hash_machine_id("4c4c4544"), hash_machine_id("4c4c4544"));
    assert_ne!(hash_machine_id("4c4c4544"), hash_machine_id("4c4c4545"));
}

#[test]
fn identity_is_object_safe() {
    let identities: Vec<Box<dyn DeviceIdentity>> =
        vec![Box::new(MachineIdentity), Box::new(FixedIdentity::new("x"))];
    assert_eq!(identities.len(), 2);
}
