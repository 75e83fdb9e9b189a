use std::collections::HashSet;

use crate::error::ResolveError;
use crate::store::{MetadataStore, SymbolId, SymbolRow};

/// Follows `target_symbol` links from `symbol` until a symbol without a
/// target is reached. The returned chain starts at `symbol` and ends at the
/// concrete definition, so an alias chain of N hops yields N + 1 rows.
///
/// A symbol id that repeats before the chain terminates is reported as
/// `ResolveError::Cycle` carrying the ids visited, repeat included.
pub fn alias_chain<S>(store: &S, symbol: SymbolId) -> Result<Vec<SymbolRow>, ResolveError>
where
	S: MetadataStore + ?Sized,
{
	let mut visited = HashSet::new();
	let mut chain: Vec<SymbolRow> = Vec::new();
	let mut current = symbol;

	loop {
		if !visited.insert(current) {
			let mut ids: Vec<SymbolId> = chain.iter().map(|s| s.id).collect();
			ids.push(current);
			return Err(ResolveError::Cycle { chain: ids });
		}

		let row = store
			.symbol(current)?
			.ok_or(ResolveError::SymbolNotFound(current))?;
		let next = row.target_symbol;
		chain.push(row);

		match next {
			None => return Ok(chain),
			Some(target) => {
				log::trace!("symbol {} is an alias of {}", current, target);
				current = target;
			}
		}
	}
}

/// Returns the id of the concrete (non-alias) symbol behind `symbol`.
pub fn resolve_concrete<S>(store: &S, symbol: SymbolId) -> Result<SymbolId, ResolveError>
where
	S: MetadataStore + ?Sized,
{
	let chain = alias_chain(store, symbol)?;
	let concrete = chain.last().map(|s| s.id).unwrap_or(symbol);
	if chain.len() > 1 {
		log::debug!(
			"resolved symbol {} to concrete symbol {} in {} hop(s)",
			symbol,
			concrete,
			chain.len() - 1
		);
	}
	Ok(concrete)
}
