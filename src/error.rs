// Error taxonomy for the verification pipeline. Every variant is terminal:
// nothing in the library recovers from these, the binary reports them and
// exits non-zero.

use std::path::PathBuf;

/// Which of the input images an encoding failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Photo,
    Image1,
    Image2,
}

impl std::fmt::Display for ImageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageRole::Photo => "photo",
            ImageRole::Image1 => "image1",
            ImageRole::Image2 => "image2",
        };
        f.write_str(name)
    }
}

/// Failures produced while turning a file into a data URI.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("failed to read file {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported mime type {mime} for file {}", path.display())]
    UnsupportedFormat { mime: String, path: PathBuf },
}

#[derive(thiserror::Error, Debug)]
pub enum VerifyError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("failed to encode {role}")]
    Encode {
        role: ImageRole,
        #[source]
        source: EncodeError,
    },

    #[error("failed to create request: {0}")]
    RequestConstruction(String),

    #[error("error sending request to API endpoint")]
    Transport(#[source] reqwest::Error),

    #[error("received HTTP response code != 200: {0}")]
    HttpStatus(u16),

    #[error("failed to decode verification response")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("failed to write verification result")]
    Output(#[from] std::io::Error),
}
