use thiserror::Error;

use crate::ir::ExprId;

macro_rules! graph_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Graph {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Graph {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant indicates a violated precondition between the engine and the code driving it,
/// never a recoverable data condition. "Cannot evaluate", "no constant known" and "no
/// transformation available" are ordinary `Option`-shaped return values throughout the crate
/// and are deliberately *not* represented here.
///
/// # Examples
///
/// ```rust
/// use cfgfold::Error;
///
/// fn report(err: Error) {
///     match err {
///         Error::Graph { message, file, line } => {
///             eprintln!("graph contract violation: {} ({}:{})", message, file, line);
///         }
///         Error::RewriteTargetMissing(id) => {
///             eprintln!("rewrite lost its target expression {}", id);
///         }
///         e => eprintln!("{}", e),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The graph, or a reference into it, is inconsistent.
    ///
    /// This error occurs when an edge names a node that does not exist, a node references a
    /// statement or expression the graph does not own, or a conditional node has no condition
    /// expression. The error includes the source location where the inconsistency was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the inconsistency
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Graph contract violation - {file}:{line}: {message}")]
    Graph {
        /// The message to be printed for the Graph error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An IR rewrite failed to locate the sub-expression it was constructed to replace.
    ///
    /// A [`crate::Transformation`] records the exact expression node it intends to substitute.
    /// If that node is no longer present in its statement tree when the transformation is
    /// applied, the transformation was built against a stale graph; silently doing nothing
    /// would leave the graph rewrite and the IR rewrite out of sync.
    #[error("Rewrite target {0} was not found in its statement tree")]
    RewriteTargetMissing(ExprId),

    /// A graph rewrite was invoked against a node other than the one it was built for.
    ///
    /// Transformations are single-use and node-specific. Applying one to a node whose kind no
    /// longer matches the shape the transformation was derived from indicates the driver
    /// re-ordered or replayed rewrites.
    #[error("Transformation built for a {expected} node was applied to a {found} node")]
    RewriteNodeMismatch {
        /// Node kind the transformation was derived from
        expected: &'static str,
        /// Node kind actually present at the target
        found: &'static str,
    },
}
