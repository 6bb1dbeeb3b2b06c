pub mod codec;
pub mod settings_storage;

pub use codec::{FieldCodec, FieldCodecRegistry, VersionFieldCodec, ensure_version_codec};
pub use settings_storage::SettingsStorage;
