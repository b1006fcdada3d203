use std::path::PathBuf;

/// A pipeline stage.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    /// Reading and decoding the inputs.
    Ingesting,
    /// Converting outlines to charstrings and TrueType glyphs.
    Encoding,
    /// Building font tables.
    Assembling,
    /// Serializing and writing the output files.
    Writing,
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match *self {
            Stage::Ingesting => "ingesting",
            Stage::Encoding => "encoding",
            Stage::Assembling => "assembling",
            Stage::Writing => "writing",
        };

        f.write_str(name)
    }
}


/// A list of errors that can abort a build.
#[derive(Debug)]
pub enum Error {
    /// A missing, unreadable or invalid input.
    ///
    /// Always happens while ingesting, before any output is touched.
    Input(String),

    /// A font couldn't be assembled from otherwise valid input.
    Assembly(Stage, String),

    /// An output file couldn't be written.
    Io {
        stage: Stage,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Returns the stage the error happened in.
    pub fn stage(&self) -> Stage {
        match *self {
            Error::Input(_) => Stage::Ingesting,
            Error::Assembly(stage, _) => stage,
            Error::Io { stage, .. } => stage,
        }
    }

    /// Returns the process exit code for this error.
    ///
    /// Input errors are configuration problems and use 2,
    /// everything else is a runtime failure and uses 1.
    pub fn exit_code(&self) -> i32 {
        match *self {
            Error::Input(_) => 2,
            Error::Assembly(..) | Error::Io { .. } => 1,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Error::Input(ref msg) => {
                write!(f, "{}", msg)
            }
            Error::Assembly(stage, ref msg) => {
                write!(f, "{} failed: {}", stage, msg)
            }
            Error::Io { stage, ref path, ref source } => {
                write!(f, "{} failed for '{}': {}", stage, path.display(), source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io { ref source, .. } => Some(source),
            _ => None,
        }
    }
}
