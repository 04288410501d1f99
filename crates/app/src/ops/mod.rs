pub mod decrypt;
pub mod encrypt;
pub mod init;
pub mod keys;
pub mod version;

pub use decrypt::Decrypt;
pub use encrypt::Encrypt;
pub use init::Init;
pub use keys::Keys;
pub use version::Version;
