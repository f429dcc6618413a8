use crate::foundation::error::{ShadegraphError, ShadegraphResult};
use crate::graph::node::NodeRef;

/// One interpolated value spliced between template fragments.
///
/// The closed tag set the graph builder accepts: a plain number (promoted to a
/// constant node), an existing graph node (referenced, never copied), or a
/// short array of numbers (promoted to a vector construction of constants).
#[derive(Clone, Debug)]
pub enum Splice {
    /// A literal number, compiled as a scalar constant.
    Number(f64),
    /// A previously built node, wired in by reference.
    Node(NodeRef),
    /// A plain vector of 2..=4 numbers.
    Array(Vec<f64>),
}

impl From<f64> for Splice {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<NodeRef> for Splice {
    fn from(n: NodeRef) -> Self {
        Self::Node(n)
    }
}

impl From<&NodeRef> for Splice {
    fn from(n: &NodeRef) -> Self {
        Self::Node(n.clone())
    }
}

impl From<Vec<f64>> for Splice {
    fn from(v: Vec<f64>) -> Self {
        Self::Array(v)
    }
}

impl<const N: usize> From<[f64; N]> for Splice {
    fn from(v: [f64; N]) -> Self {
        Self::Array(v.to_vec())
    }
}

/// A composite expression input: literal text fragments interleaved with
/// already-evaluated interpolation values.
///
/// This is the explicit two-sequence replacement for tagged string templates:
/// `fragments.len() == splices.len() + 1` always holds, with splice `i` sitting
/// between fragments `i` and `i + 1`. Diagnostics render the template with
/// `{i}` markers standing in for the splices; every compile-error offset points
/// into that rendered text.
#[derive(Clone, Debug)]
pub struct Template {
    pub(crate) fragments: Vec<String>,
    pub(crate) splices: Vec<Splice>,
}

impl Template {
    /// Start a template from its leading text fragment.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![text.into()],
            splices: Vec::new(),
        }
    }

    /// Append an interpolated value followed by the next text fragment.
    ///
    /// The chain keeps the fragment/splice count invariant by construction:
    ///
    /// ```
    /// use shadegraph::Template;
    ///
    /// let t = Template::new("sin(").splice(0.5, ") * 2.0");
    /// assert_eq!(t.to_string(), "sin({0}) * 2.0");
    /// ```
    pub fn splice(mut self, value: impl Into<Splice>, text: impl Into<String>) -> Self {
        self.splices.push(value.into());
        self.fragments.push(text.into());
        self
    }

    /// Build a template from pre-assembled sequences, validating the
    /// fragment count = splice count + 1 invariant.
    pub fn from_parts(fragments: Vec<String>, splices: Vec<Splice>) -> ShadegraphResult<Self> {
        if fragments.len() != splices.len() + 1 {
            return Err(ShadegraphError::validation(format!(
                "template must have one more fragment than splice, got {} fragments / {} splices",
                fragments.len(),
                splices.len()
            )));
        }
        Ok(Self { fragments, splices })
    }

    /// Number of interpolated values.
    pub fn splice_count(&self) -> usize {
        self.splices.len()
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, frag) in self.fragments.iter().enumerate() {
            if i > 0 {
                write!(f, "{{{}}}", i - 1)?;
            }
            f.write_str(frag)?;
        }
        Ok(())
    }
}
