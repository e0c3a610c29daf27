use mongoba::crypto::{PbeKdfParams, decrypt, encrypt_with, is_encrypted};
use mongoba::errors::BackupError;
use proptest::prelude::*;

fn fast() -> PbeKdfParams {
    PbeKdfParams { t_cost: 1, m_cost_kib: 256, lanes: 1 }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 16,
        .. proptest::test_runner::Config::default()
    })]
    #[test]
    fn prop_encrypt_decrypt_roundtrip(msg in "\\PC{0,256}", key in "[ -~]{1,32}") {
        let ct = encrypt_with(&msg, &key, &fast()).unwrap();
        prop_assert!(is_encrypted(&ct));
        prop_assert_eq!(decrypt(&ct, &key).unwrap(), msg);
    }

    #[test]
    fn prop_wrong_key_never_yields_plaintext(msg in "[a-z]{0,64}", key in "[a-z]{1,16}", other in "[A-Z]{1,16}") {
        let ct = encrypt_with(&msg, &key, &fast()).unwrap();
        prop_assert!(matches!(decrypt(&ct, &other), Err(BackupError::Decryption)));
    }

    #[test]
    fn prop_flipped_ciphertext_byte_fails(msg in "[a-z]{1,64}", pos in any::<prop::sample::Index>()) {
        let ct = encrypt_with(&msg, "k", &fast()).unwrap();
        let mut bytes = hex::decode(&ct).unwrap();
        // past the 45-byte header: ciphertext or tag
        let i = 45 + pos.index(bytes.len() - 45);
        bytes[i] ^= 0x80;
        prop_assert!(matches!(decrypt(&hex::encode(bytes), "k"), Err(BackupError::Decryption)));
    }
}
