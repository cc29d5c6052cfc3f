//! In-memory claim store

use crate::StoreError;
use dibs_domain::traits::{ClaimPatch, ClaimQuery, ClaimStore};
use dibs_domain::{Claim, ClaimId, ClaimStatus};

/// In-memory implementation of `ClaimStore`
///
/// Backed by a plain vector. Useful for tests and for embedding dibs
/// without a database. Mutation requires `&mut self`, so callers sharing a
/// store across threads wrap it in their own lock; each trait call is then
/// atomic at claim granularity.
#[derive(Debug, Default)]
pub struct MemoryStore {
    claims: Vec<Claim>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of claims held
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether the store holds no claims
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

fn matches(claim: &Claim, query: &ClaimQuery) -> bool {
    query.status.is_none_or(|s| claim.status == s)
        && query.repo_owner.as_ref().is_none_or(|o| claim.repository.owner == *o)
        && query.repo_name.as_ref().is_none_or(|n| claim.repository.name == *n)
        && query.issue_number.is_none_or(|n| claim.issue.number == n)
        && query.claimant.is_none_or(|p| claim.claimant == p)
}

impl ClaimStore for MemoryStore {
    type Error = StoreError;

    fn insert_claim(&mut self, claim: Claim) -> Result<ClaimId, Self::Error> {
        if self.claims.iter().any(|c| c.id == claim.id) {
            return Err(StoreError::Duplicate);
        }

        let id = claim.id;
        self.claims.push(claim);
        Ok(id)
    }

    fn get_claim(&self, id: ClaimId) -> Result<Option<Claim>, Self::Error> {
        Ok(self.claims.iter().find(|c| c.id == id).cloned())
    }

    fn query_claims(&self, query: &ClaimQuery) -> Result<Vec<Claim>, Self::Error> {
        let mut results: Vec<Claim> = self
            .claims
            .iter()
            .filter(|c| matches(c, query))
            .cloned()
            .collect();

        results.sort_by_key(|c| c.created_at);
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    fn update_claim(
        &mut self,
        id: ClaimId,
        expected_status: ClaimStatus,
        patch: &ClaimPatch,
    ) -> Result<Option<Claim>, Self::Error> {
        let Some(claim) = self.claims.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if claim.status != expected_status {
            return Ok(None);
        }

        patch.apply(claim);
        Ok(Some(claim.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibs_domain::{Issue, PrincipalId, Repository};

    fn claim(owner: &str, name: &str, number: u64, now: u64) -> Claim {
        Claim::new(
            Repository::new(owner, name),
            Issue::new(number, format!("https://example.com/{}/{}/issues/{}", owner, name, number)),
            PrincipalId::new(),
            now,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MemoryStore::new();
        let c = claim("octo", "widgets", 7, 100);
        let id = store.insert_claim(c.clone()).unwrap();

        assert_eq!(store.get_claim(id).unwrap(), Some(c));
        assert_eq!(store.get_claim(ClaimId::new()).unwrap(), None);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut store = MemoryStore::new();
        let c = claim("octo", "widgets", 7, 100);

        store.insert_claim(c.clone()).unwrap();
        assert!(matches!(store.insert_claim(c), Err(StoreError::Duplicate)));
    }

    #[test]
    fn test_query_filters() {
        let mut store = MemoryStore::new();
        let mut completed = claim("octo", "widgets", 1, 100);
        completed.status = ClaimStatus::Completed;
        store.insert_claim(completed).unwrap();
        store.insert_claim(claim("octo", "widgets", 2, 200)).unwrap();
        store.insert_claim(claim("octo", "gears", 2, 300)).unwrap();

        let active = store
            .query_claims(&ClaimQuery::with_status(ClaimStatus::Active))
            .unwrap();
        assert_eq!(active.len(), 2);

        let for_issue = store
            .query_claims(&ClaimQuery::active_for_issue(&Repository::new("octo", "widgets"), 2))
            .unwrap();
        assert_eq!(for_issue.len(), 1);
        assert_eq!(for_issue[0].issue.number, 2);
    }

    #[test]
    fn test_query_by_claimant_and_limit() {
        let mut store = MemoryStore::new();
        let mine = claim("octo", "widgets", 1, 100);
        let claimant = mine.claimant;
        store.insert_claim(mine).unwrap();
        store.insert_claim(claim("octo", "widgets", 2, 200)).unwrap();

        let mine = store.query_claims(&ClaimQuery::for_claimant(claimant)).unwrap();
        assert_eq!(mine.len(), 1);

        let limited = store
            .query_claims(&ClaimQuery {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_update_requires_expected_status() {
        let mut store = MemoryStore::new();
        let c = claim("octo", "widgets", 7, 100);
        let id = store.insert_claim(c).unwrap();

        let patch = ClaimPatch {
            status: Some(ClaimStatus::Released),
            ..Default::default()
        };

        // First writer wins
        assert!(store.update_claim(id, ClaimStatus::Active, &patch).unwrap().is_some());
        // Second writer sees the claim moved and loses
        assert!(store.update_claim(id, ClaimStatus::Active, &patch).unwrap().is_none());
    }

    #[test]
    fn test_update_unknown_id() {
        let mut store = MemoryStore::new();
        let patch = ClaimPatch::default();

        assert!(store
            .update_claim(ClaimId::new(), ClaimStatus::Active, &patch)
            .unwrap()
            .is_none());
    }
}
