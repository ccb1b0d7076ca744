/// Environment-backed service configuration.
///
/// A service defines a `Deserialize` struct whose field names map to env
/// vars (uppercased) and marks it with this trait. Startup panics on a
/// missing or unparseable required var; there is nothing sensible to do
/// without configuration.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Self {
        envy::from_env().expect("invalid environment configuration")
    }
}
