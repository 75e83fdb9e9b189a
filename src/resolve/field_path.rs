use crate::error::ResolveError;
use crate::resolve::symbol::resolve_concrete;
use crate::store::{FieldId, FieldRow, MetadataStore, SymbolId};

/// The resolved target of a `union_select` entry: the union-typed field and
/// the member chosen inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionArm {
	pub parent_field: FieldId,
	pub arm_field: FieldId,
}

/// Resolves `dotted_path` below `root_symbol_name` to the union field it
/// names, then finds `arm_field_name` among that union's members.
///
/// The first path segment stands for the root symbol itself and is skipped.
/// Every later segment is looked up in the current layer, and the walk
/// descends into that field's concrete type. When a layer holds several
/// fields with the same name, the last one (highest field id) wins.
pub fn resolve_union_arm<S>(
	store: &S,
	root_symbol_name: &str,
	dotted_path: &str,
	arm_field_name: &str,
) -> Result<UnionArm, ResolveError>
where
	S: MetadataStore + ?Sized,
{
	let root = store
		.symbol_id_by_name(root_symbol_name)?
		.ok_or_else(|| ResolveError::SymbolNameNotFound(root_symbol_name.to_string()))?;
	let mut layer = concrete_fields(store, root)?;

	let mut parent_field = None;
	let mut segments = dotted_path.split('.');
	let mut walked: Vec<&str> = segments.next().into_iter().collect();
	for segment in segments {
		walked.push(segment);
		let field = pick_field(&layer, segment).ok_or_else(|| ResolveError::SegmentNotFound {
			segment: segment.to_string(),
			path: walked.join("."),
		})?;
		let ty = field.type_symbol.ok_or_else(|| ResolveError::UntypedField {
			field: segment.to_string(),
			path: dotted_path.to_string(),
		})?;

		parent_field = Some(field.id);
		layer = concrete_fields(store, ty)?;
	}

	let parent_field = parent_field.ok_or_else(|| ResolveError::EmptyPath {
		path: dotted_path.to_string(),
	})?;
	let arm = pick_field(&layer, arm_field_name).ok_or_else(|| ResolveError::ArmNotFound {
		arm: arm_field_name.to_string(),
		path: dotted_path.to_string(),
	})?;

	log::info!("Selecting field {} from {} union", arm_field_name, dotted_path);
	Ok(UnionArm {
		parent_field,
		arm_field: arm.id,
	})
}

fn concrete_fields<S>(store: &S, symbol: SymbolId) -> Result<Vec<FieldRow>, ResolveError>
where
	S: MetadataStore + ?Sized,
{
	let concrete = resolve_concrete(store, symbol)?;
	Ok(store.fields_of(concrete)?)
}

/// Last match wins. Duplicate names are an upstream defect, so they are
/// logged, but resolution still proceeds.
fn pick_field<'f>(layer: &'f [FieldRow], name: &str) -> Option<&'f FieldRow> {
	let mut matches = layer.iter().filter(|f| f.name == name);
	let first = matches.next()?;
	match matches.last() {
		Some(last) => {
			log::warn!(
				"symbol {} has several fields named '{}'; using field {}",
				first.symbol,
				name,
				last.id
			);
			Some(last)
		}
		None => Some(first),
	}
}
