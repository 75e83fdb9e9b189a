//! Discovers telemetry and command declarations in the module tree and
//! persists them together with their union selections.

pub mod report;

use std::collections::HashMap;

use crate::document::{ModuleNode, Selection, UnionSelect, children, module_path};
use crate::error::{MergeError, ResolveError, ValidationError};
use crate::resolve::resolve_union_arm;
use crate::store::{MetadataStore, ModuleId, NewCommand, NewTelemetry, RecordId};

pub use report::{Diagnostic, MergeReport, Severity, Tally};

/// A module waiting on the work stack.
struct Frame<'d> {
	name: &'d str,
	node: &'d ModuleNode,
	path: String,
	depth: usize,
}

/// What declarations inside one module need to know about it.
struct ModuleContext<'a> {
	id: ModuleId,
	path: &'a str,
}

pub struct TreeWalker<'s, S: MetadataStore + ?Sized> {
	store: &'s S,
	module_ids: HashMap<String, ModuleId>,
	max_depth: usize,
	report: MergeReport,
}

impl<'s, S: MetadataStore + ?Sized> TreeWalker<'s, S> {
	/// Loads the module id table once; it is reused for the whole walk.
	pub fn new(store: &'s S, max_depth: usize) -> Result<Self, MergeError> {
		let module_ids = store.module_ids()?;
		log::debug!("loaded {} module id(s)", module_ids.len());
		Ok(Self {
			store,
			module_ids,
			max_depth,
			report: MergeReport::default(),
		})
	}

	/// Walks `roots` and every module nested below them, depth first in
	/// declaration order. Within a module, telemetry precedes commands.
	pub fn walk(mut self, roots: Selection<'_>) -> Result<MergeReport, MergeError> {
		let parent_path = roots.parent_path;
		let mut stack: Vec<Frame<'_>> = roots
			.modules
			.into_iter()
			.rev()
			.map(|(name, node)| Frame {
				name,
				node,
				path: module_path(&parent_path, name),
				depth: 1,
			})
			.collect();

		while let Some(frame) = stack.pop() {
			if frame.depth > self.max_depth {
				return Err(MergeError::DepthExceeded {
					path: frame.path,
					limit: self.max_depth,
				});
			}
			self.visit(&frame)?;

			for (name, child) in children(frame.node).into_iter().rev() {
				stack.push(Frame {
					name,
					node: child,
					path: module_path(&frame.path, name),
					depth: frame.depth + 1,
				});
			}
		}

		log::info!(
			"walked {} module(s): telemetry {}+{}, commands {}+{}, union selections {}+{} (inserted+existing), {} warning(s), {} error(s)",
			self.report.modules_visited,
			self.report.telemetry.inserted,
			self.report.telemetry.existing,
			self.report.commands.inserted,
			self.report.commands.existing,
			self.report.union_selections.inserted,
			self.report.union_selections.existing,
			self.report.warnings().count(),
			self.report.errors().count(),
		);
		Ok(self.report)
	}

	fn visit(&mut self, frame: &Frame<'_>) -> Result<(), MergeError> {
		self.report.modules_visited += 1;
		if frame.node.telemetry.is_none() && frame.node.commands.is_none() {
			// Pure container: nothing here needs a module id.
			return Ok(());
		}

		let id = *self
			.module_ids
			.get(frame.name)
			.ok_or_else(|| MergeError::UnknownModule {
				name: frame.name.to_string(),
			})?;
		let module = ModuleContext {
			id,
			path: &frame.path,
		};
		self.walk_telemetry(&module, frame.node)?;
		self.walk_commands(&module, frame.node)
	}

	fn walk_telemetry(
		&mut self,
		module: &ModuleContext<'_>,
		node: &ModuleNode,
	) -> Result<(), MergeError> {
		let Some(messages) = node.telemetry.as_ref() else {
			return Ok(());
		};

		for (name, decl) in messages {
			let path = format!("{}.telemetry.{}", module.path, name);
			let Some(decl) = decl else {
				self.report.invalid(path, ValidationError::EmptyDeclaration);
				continue;
			};

			let message_id = self.message_id(&path, decl.msg_id);
			let Some((structure, symbol)) = self.structure_symbol(&path, decl.structure.as_deref())?
			else {
				continue;
			};

			let existing = self.store.find_telemetry(name, module.id, message_id)?;
			let record = match existing {
				Some(id) => id,
				None => self.store.insert_telemetry(&NewTelemetry {
					name: name.clone(),
					message_id,
					macro_name: name.clone(),
					symbol,
					module: module.id,
					min_rate: decl.min_rate,
				})?,
			};
			self.report.telemetry.record(existing.is_none());

			if let Some(select) = decl.union_select.as_ref() {
				self.select_union(&path, structure, select, RecordId::Telemetry(record))?;
			}
		}
		Ok(())
	}

	fn walk_commands(
		&mut self,
		module: &ModuleContext<'_>,
		node: &ModuleNode,
	) -> Result<(), MergeError> {
		let Some(groups) = node.commands.as_ref() else {
			return Ok(());
		};

		for (group_name, group) in groups {
			let group_path = format!("{}.commands.{}", module.path, group_name);
			let Some(group) = group else {
				self.report.invalid(group_path, ValidationError::EmptyDeclaration);
				continue;
			};

			let message_id = self.message_id(&group_path, group.msg_id);
			let Some(variants) = group.commands.as_ref() else {
				self.report.warn(
					format!("{}.commands", group_path),
					"command group declares no commands",
				);
				continue;
			};

			for (name, variant) in variants {
				let path = format!("{}.commands.{}", group_path, name);
				let Some(variant) = variant else {
					self.report.invalid(path, ValidationError::EmptyDeclaration);
					continue;
				};

				let Some((structure, symbol)) =
					self.structure_symbol(&path, variant.structure.as_deref())?
				else {
					continue;
				};
				let Some(command_code) = variant.cc else {
					self.report
						.invalid(format!("{}.cc", path), ValidationError::MissingCommandCode);
					continue;
				};

				let existing = self
					.store
					.find_command(name, command_code, module.id, message_id)?;
				let record = match existing {
					Some(id) => id,
					None => self.store.insert_command(&NewCommand {
						name: name.clone(),
						command_code,
						message_id,
						macro_name: group_name.clone(),
						symbol,
						module: module.id,
					})?,
				};
				self.report.commands.record(existing.is_none());

				if let Some(select) = variant.union_select.as_ref() {
					self.select_union(&path, structure, select, RecordId::Command(record))?;
				}
			}
		}
		Ok(())
	}

	/// Missing message ids degrade to 0 with a warning.
	fn message_id(&mut self, path: &str, declared: Option<i64>) -> i64 {
		match declared {
			Some(id) => id,
			None => {
				self.report.warn(
					format!("{}.msgID", path),
					"msgID must not be empty. Setting it to 0.",
				);
				0
			}
		}
	}

	/// Looks up the declaration's `struct`. `Ok(None)` means the declaration
	/// was reported and should be skipped.
	fn structure_symbol<'d>(
		&mut self,
		path: &str,
		structure: Option<&'d str>,
	) -> Result<Option<(&'d str, i64)>, MergeError> {
		let field_path = format!("{}.struct", path);
		let structure = match structure.map(str::trim) {
			Some(s) if !s.is_empty() => s,
			_ => {
				self.report.invalid(field_path, ValidationError::MissingStruct);
				return Ok(None);
			}
		};
		match self.store.symbol_id_by_name(structure)? {
			Some(symbol) => Ok(Some((structure, symbol))),
			None => {
				self.report.invalid(
					field_path,
					ValidationError::StructNotFound(structure.to_string()),
				);
				Ok(None)
			}
		}
	}

	/// Resolves and records a union selection for `owner`. Resolution
	/// problems skip the selection only; the owning record stays.
	fn select_union(
		&mut self,
		path: &str,
		structure: &str,
		select: &UnionSelect,
		owner: RecordId,
	) -> Result<(), MergeError> {
		let path = format!("{}.union_select", path);
		let (dotted, arm_name) = match select.single() {
			Ok(pair) => pair,
			Err(e) => {
				self.report.invalid(path, e);
				return Ok(());
			}
		};

		let arm = match resolve_union_arm(self.store, structure, dotted, arm_name) {
			Ok(arm) => arm,
			Err(ResolveError::Store(e)) => return Err(e.into()),
			Err(e) => {
				self.report
					.invalid(path, ValidationError::UnionResolution(e));
				return Ok(());
			}
		};

		match self
			.store
			.find_union_selection(arm.parent_field, arm.arm_field)?
		{
			Some(row) if row.owner == owner => self.report.union_selections.record(false),
			Some(row) => self.report.invalid(
				path,
				ValidationError::SelectionConflict {
					parent: arm.parent_field,
					arm: arm.arm_field,
					owner: row.owner.to_string(),
					requested: owner.to_string(),
				},
			),
			None => {
				self.store
					.insert_union_selection(arm.parent_field, arm.arm_field, owner)?;
				self.report.union_selections.record(true);
			}
		}
		Ok(())
	}
}
