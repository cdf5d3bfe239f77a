use snafu::Snafu;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportError {
    #[snafu(display("backend base url '{raw}' is invalid: {source}"))]
    InvalidBaseUrl {
        stage: &'static str,
        raw: String,
        source: url::ParseError,
    },
    #[snafu(display("failed to build http client: {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request failed on `{stage}`, {source}"))]
    Request {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("backend returned status {status}: {body}"))]
    Status {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode backend response on `{stage}`, {source}"))]
    Decode {
        stage: &'static str,
        source: reqwest::Error,
    },
}

impl TransportError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl { stage, .. }
            | Self::BuildClient { stage, .. }
            | Self::Request { stage, .. }
            | Self::Status { stage, .. }
            | Self::Decode { stage, .. } => stage,
        }
    }
}
