use solana_rpc_client_api::client_error::Error as ClientError;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Invalid provider configuration: {0}")]
    Configuration(String),
    #[error("Program `{0}` is not registered in the workspace")]
    NotFound(String),
    #[error("IDL artifact for `{name}` is missing or does not match the compiled program")]
    SchemaMismatch {
        name: String,
        #[source]
        source: mpt_idl::Error,
    },
    #[error(transparent)]
    Rpc(#[from] Box<ClientError>),
    #[error("{0}")]
    Program(String),
}

impl From<ClientError> for HarnessError {
    fn from(error: ClientError) -> Self {
        HarnessError::Rpc(Box::new(error))
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
