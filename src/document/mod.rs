//! Typed view of the module document.
//!
//! The document is a YAML tree of nested modules:
//!
//! ```yaml
//! modules:
//!   nav:
//!     telemetry:
//!       NavStatus:
//!         msgID: 100
//!         struct: NAV_STATUS_T
//!         union_select: { NAV_STATUS_T.mode: safe_mode }
//!     commands:
//!       NAV_CMD_MID:
//!         msgID: 0x1880
//!         commands:
//!           Reset: { cc: 1, struct: NAV_RESET_CMD_T }
//!     modules: { ... }
//! ```
//!
//! Every map keeps declaration order. Keys that are not recognized are
//! ignored.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{MergeError, ValidationError};

/// One module: its own declarations plus nested modules. Any of the three
/// keys may be missing or explicitly null.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ModuleNode {
	#[serde(default)]
	pub telemetry: Option<IndexMap<String, Option<TelemetryDecl>>>,
	#[serde(default)]
	pub commands: Option<IndexMap<String, Option<CommandGroupDecl>>>,
	#[serde(default)]
	pub modules: Option<IndexMap<String, Option<ModuleNode>>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TelemetryDecl {
	#[serde(default, rename = "msgID")]
	pub msg_id: Option<i64>,
	#[serde(default, rename = "struct")]
	pub structure: Option<String>,
	#[serde(default)]
	pub min_rate: Option<f64>,
	#[serde(default)]
	pub union_select: Option<UnionSelect>,
}

/// A message id shared by a group of command variants.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CommandGroupDecl {
	#[serde(default, rename = "msgID")]
	pub msg_id: Option<i64>,
	#[serde(default)]
	pub commands: Option<IndexMap<String, Option<CommandDecl>>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CommandDecl {
	#[serde(default)]
	pub cc: Option<i64>,
	#[serde(default, rename = "struct")]
	pub structure: Option<String>,
	#[serde(default)]
	pub union_select: Option<UnionSelect>,
}

/// `{ "<root>.<path...>": "<arm>" }`; exactly one entry is meaningful.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct UnionSelect(pub IndexMap<String, String>);

impl UnionSelect {
	/// The single (dotted path, arm name) pair.
	pub fn single(&self) -> Result<(&str, &str), ValidationError> {
		match self.0.len() {
			1 => {
				let (path, arm) = self.0.iter().next().ok_or(ValidationError::UnionSelectShape(0))?;
				Ok((path.as_str(), arm.as_str()))
			}
			n => Err(ValidationError::UnionSelectShape(n)),
		}
	}
}

/// A parsed document. The root always carried a `modules` key, though its
/// value may be null.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	root: ModuleNode,
}

/// The modules a merge run starts from, in declaration order.
pub type Subtree<'d> = Vec<(&'d str, &'d ModuleNode)>;

/// Modules picked by [`Document::select_subtree`], with the dotted document
/// path of their parent (empty when they sit at the top level).
#[derive(Debug)]
pub struct Selection<'d> {
	pub parent_path: String,
	pub modules: Subtree<'d>,
}

/// Dotted document path of module `name` nested under `parent`.
pub fn module_path(parent: &str, name: &str) -> String {
	if parent.is_empty() {
		format!("modules.{}", name)
	} else {
		format!("{}.modules.{}", parent, name)
	}
}

static EMPTY_MODULE: ModuleNode = ModuleNode {
	telemetry: None,
	commands: None,
	modules: None,
};

impl Document {
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MergeError> {
		let text = std::fs::read_to_string(path.as_ref())?;
		log::debug!("read document {}", path.as_ref().display());
		Self::from_yaml(&text)
	}

	pub fn from_yaml(text: &str) -> Result<Self, MergeError> {
		let value: serde_yaml::Value = serde_yaml::from_str(text)?;
		let has_modules = value
			.as_mapping()
			.map(|m| m.contains_key("modules"))
			.unwrap_or(false);
		if !has_modules {
			return Err(MergeError::Structural(
				"document has no top-level 'modules' key".to_string(),
			));
		}
		let root: ModuleNode = serde_yaml::from_value(value)?;
		Ok(Self { root })
	}

	/// Selects the modules named by a slash-separated path. `"/"` selects
	/// every top-level module; `"/a/b"` selects module `b` nested in `a`.
	/// Empty segments are skipped.
	pub fn select_subtree(&self, selector: &str) -> Result<Selection<'_>, MergeError> {
		let mut parent_path = String::new();
		let mut selected: Option<(&str, &ModuleNode)> = None;

		for segment in selector.split('/').filter(|s| !s.is_empty()) {
			let parent = match selected {
				Some((name, node)) => {
					parent_path = module_path(&parent_path, name);
					node
				}
				None => &self.root,
			};
			let child = parent
				.modules
				.as_ref()
				.and_then(|children| children.get_key_value(segment))
				.ok_or_else(|| MergeError::ModulePathNotFound {
					segment: segment.to_string(),
					path: selector.to_string(),
				})?;
			selected = Some((child.0.as_str(), child.1.as_ref().unwrap_or(&EMPTY_MODULE)));
		}

		let modules = match selected {
			Some(one) => vec![one],
			None => children(&self.root),
		};
		Ok(Selection {
			parent_path,
			modules,
		})
	}
}

/// Nested modules of `node`; null entries read as empty modules.
pub fn children(node: &ModuleNode) -> Subtree<'_> {
	node.modules
		.iter()
		.flatten()
		.map(|(name, child)| (name.as_str(), child.as_ref().unwrap_or(&EMPTY_MODULE)))
		.collect()
}
