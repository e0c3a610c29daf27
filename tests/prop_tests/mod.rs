// Property suites, one folder per area
#[path = "cli/prop_selection.rs"]
mod cli;
#[path = "crypto/prop_crypto.rs"]
mod crypto;
#[path = "serializer/prop_serializer.rs"]
mod serializer;
