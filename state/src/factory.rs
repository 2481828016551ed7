// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Applies batches of transfers and votes atomically against the state
//! store, keeping the candidate ranker in sync.
//!
//! `commit` is the only legal mutator of ranker state. It is structured as
//! an explicit two-phase commit: every mutation is staged in an in-memory
//! overlay (mirroring the UTXO view's snapshot-plus-overlay idiom) and only
//! flushed to the trie once every transfer and vote in the batch has
//! preflighted clean, so a failure partway through leaves no visible
//! mutation.

use std::collections::{HashMap, HashSet};

use chain_core::{Address, Hash, Transfer, Vote};

use crate::account::AccountState;
use crate::candidate::CandidateRanker;
use crate::error::{Error, ErrorKind, TransferFault, VoteFault};
use crate::store::StateStore;
use crate::trie::Trie;

/// Default size of the elected set (`candidateSize`).
pub const DEFAULT_CANDIDATE_SIZE: usize = 101;
/// Default size of the runner-up buffer (`candidateBufferSize`).
pub const DEFAULT_CANDIDATE_BUFFER_SIZE: usize = 400;

/// An in-memory staging area for account states touched by a batch still
/// being preflighted. Reads fall through to the underlying store; nothing
/// here is visible to the store until `flush` is called.
struct Overlay<'a, T: Trie> {
	store: &'a StateStore<T>,
	staged: HashMap<Address, AccountState>,
}

impl<'a, T: Trie> Overlay<'a, T> {
	fn new(store: &'a StateStore<T>) -> Overlay<'a, T> {
		Overlay {
			store,
			staged: HashMap::new(),
		}
	}

	fn get(&self, addr: Address) -> Result<AccountState, Error> {
		if let Some(s) = self.staged.get(&addr) {
			return Ok(s.clone());
		}
		self.store.get_or_default(addr)
	}

	fn try_get(&self, addr: &Address) -> Result<Option<AccountState>, Error> {
		if let Some(s) = self.staged.get(addr) {
			return Ok(Some(s.clone()));
		}
		self.store.try_get(addr)
	}

	fn put(&mut self, state: AccountState) {
		self.staged.insert(state.address, state);
    }
}

/// A candidate address whose vote total must be recomputed once a batch's
/// mutations are flushed.
type AffectedSet = HashSet<Address>;

/// Owns the account-state store and the candidate ranker, and applies
/// committed batches to both.
pub struct StateFactory<T: Trie> {
	store: StateStore<T>,
	ranker: CandidateRanker,
	/// Reverse index: votee -> the set of accounts whose votee currently
	/// points there. Maintained unconditionally for every address, not only
	/// candidates, so that a vote cast before its target declares candidacy
	/// still counts once that target does (provided the voter hasn't since
	/// moved its vote elsewhere).
	voters_of: HashMap<Address, HashSet<Address>>,
}

impl<T: Trie> StateFactory<T> {
	/// Builds a state factory over `trie`, with the ranker sized per
	/// `candidate_size`/`candidate_buffer_size`.
	pub fn new(trie: T, candidate_size: usize, candidate_buffer_size: usize) -> StateFactory<T> {
		StateFactory {
			store: StateStore::new(trie),
			ranker: CandidateRanker::new(candidate_size, candidate_buffer_size),
			voters_of: HashMap::new(),
		}
	}

	/// Installs a fresh account with `init_balance`.
	pub fn create_state(&mut self, addr: Address, init_balance: u64) -> Result<AccountState, Error> {
		self.store.create_state(addr, init_balance)
	}

	/// Current nonce for `addr` (0 if never created).
	pub fn nonce(&self, addr: &Address) -> Result<u64, Error> {
		self.store.nonce(addr)
	}

	/// Sets `addr`'s nonce directly, bypassing transfer preflight.
	pub fn set_nonce(&mut self, addr: Address, nonce: u64) -> Result<(), Error> {
		self.store.set_nonce(addr, nonce)
	}

	/// Current balance for `addr` (0 if never created).
	pub fn balance(&self, addr: &Address) -> Result<u64, Error> {
		self.store.balance(addr)
	}

	/// The trie's committed root hash.
	pub fn root_hash(&self) -> Hash {
		self.store.root_hash()
	}

	/// Stable snapshot of the elected set.
	pub fn candidates(&self) -> Vec<crate::candidate::Candidate> {
		self.ranker.elected()
	}

	/// Stable snapshot of the runner-up buffer.
	pub fn candidates_buffer(&self) -> Vec<crate::candidate::Candidate> {
		self.ranker.buffer()
	}

	/// Applies `transfers` (in order) then `votes` (in order) as one atomic
	/// batch. On any preflight failure, no mutation is visible: the store,
	/// ranker and vote index are all left exactly as they were.
	pub fn commit_state_changes(&mut self, transfers: &[Transfer], votes: &[Vote]) -> Result<(), Error> {
		let mut overlay = Overlay::new(&self.store);
		let mut affected: AffectedSet = HashSet::new();
		let mut vote_changes: Vec<(Address, Option<Address>, Option<Address>)> = Vec::new();

		for (index, transfer) in transfers.iter().enumerate() {
			apply_transfer(&mut overlay, transfer, &mut affected).map_err(|e| {
				log::warn!("commit_state_changes: transfer {} failed preflight: {}", index, e);
				e
			})?;
		}
		for (index, vote) in votes.iter().enumerate() {
			apply_vote(&mut overlay, vote, &mut affected, &mut vote_changes).map_err(|e| {
				log::warn!("commit_state_changes: vote {} failed preflight: {}", index, e);
				e
			})?;
		}

		for state in overlay.staged.into_values() {
			self.store.put(&state)?;
		}

		for (voter, old_votee, new_votee) in vote_changes {
			if let Some(old) = old_votee {
				if let Some(set) = self.voters_of.get_mut(&old) {
					set.remove(&voter);
				}
			}
			if let Some(new) = new_votee {
				self.voters_of.entry(new).or_default().insert(voter);
			}
		}

		for candidate_addr in affected {
			self.recompute_and_rank(candidate_addr)?;
		}

		Ok(())
	}

	fn recompute_and_rank(&mut self, addr: Address) -> Result<(), Error> {
		let is_candidate = self.store.get_or_default(addr)?.is_candidate;
		// A withdrawn candidate is no longer is_candidate but may already sit
		// in the ranker with a stale pre-withdrawal total; it still needs one
		// more recompute (driving it to whatever its remaining voters sum to,
		// often 0) so the ranker reflects the withdrawal instead of keeping
		// the old number forever.
		if !is_candidate && !self.ranker.contains(&addr) {
			return Ok(());
		}
		let total = match self.voters_of.get(&addr) {
			Some(voters) => {
				let mut sum = 0u64;
				for voter in voters {
					sum += self.store.balance(voter)?;
				}
				sum
			}
			None => 0,
		};
		self.ranker.update(addr, total);
		Ok(())
	}
}

fn apply_transfer<T: Trie>(overlay: &mut Overlay<T>, transfer: &Transfer, affected: &mut AffectedSet) -> Result<(), Error> {
	let sender = overlay
		.try_get(&transfer.sender)?
		.ok_or_else(|| Error::from(ErrorKind::InvalidTransfer(TransferFault::UnknownSender)))?;

	if transfer.nonce != sender.nonce + 1 {
		return Err(ErrorKind::InvalidTransfer(TransferFault::NonceGap).into());
	}
	if transfer.amount > sender.balance {
		return Err(ErrorKind::InvalidTransfer(TransferFault::InsufficientBalance).into());
	}

	let mut sender = sender;
	sender.balance -= transfer.amount;
	sender.nonce = transfer.nonce;
	let sender_votee = sender.votee;
	overlay.put(sender);

	let mut recipient = overlay.get(transfer.recipient)?;
	recipient.balance += transfer.amount;
	let recipient_votee = recipient.votee;
	overlay.put(recipient);

	if let Some(v) = sender_votee {
		affected.insert(v);
	}
	if let Some(v) = recipient_votee {
		affected.insert(v);
	}

	Ok(())
}

fn apply_vote<T: Trie>(
	overlay: &mut Overlay<T>,
	vote: &Vote,
	affected: &mut AffectedSet,
	vote_changes: &mut Vec<(Address, Option<Address>, Option<Address>)>,
) -> Result<(), Error> {
	let mut voter_state = overlay
		.try_get(&vote.voter)?
		.ok_or_else(|| Error::from(ErrorKind::InvalidVote(VoteFault::UnknownVoter)))?;

	let old_votee = voter_state.votee;

	if vote.is_withdrawal() {
		if let Some(old) = old_votee {
			affected.insert(old);
			vote_changes.push((vote.voter, Some(old), None));
		}
		if voter_state.self_vote {
			voter_state.is_candidate = false;
		}
		voter_state.votee = None;
		voter_state.self_vote = false;
		overlay.put(voter_state);
		return Ok(());
	}

	// Self-vote and vote-for-other both register the voter against their
	// chosen votee unconditionally, whether or not that votee currently
	// holds candidacy. A vote cast for a not-yet-candidate address leaves
	// no visible ranking effect today (recompute_and_rank no-ops until the
	// target is_candidate), but the registration itself is live: if the
	// voter's votee is still that address at the moment it later declares
	// candidacy, its weight counts from that point on. Switching the vote
	// away before then drops the registration, same as any other change.
	let votee = vote.votee.expect("a non-withdrawal vote always names a votee");
	let is_self = votee == vote.voter;

	voter_state.votee = Some(votee);
	voter_state.self_vote = is_self;
	if is_self {
		voter_state.is_candidate = true;
	}
	overlay.put(voter_state);

	affected.insert(votee);
	if let Some(old) = old_votee {
		affected.insert(old);
	}
	vote_changes.push((vote.voter, old_votee, Some(votee)));

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::trie::MemTrie;

	fn addr(byte: u8) -> Address {
		Address::from_bytes([byte; 20])
	}

	fn factory() -> StateFactory<MemTrie> {
		StateFactory::new(MemTrie::new(), 2, 4)
	}

	#[test]
	fn transfer_moves_balance_and_bumps_nonce() {
		let mut sf = factory();
		sf.create_state(addr(1), 100).unwrap();
		sf.create_state(addr(2), 0).unwrap();

		let t = Transfer::new(addr(1), addr(2), 1, 40);
		sf.commit_state_changes(&[t], &[]).unwrap();

		assert_eq!(sf.balance(&addr(1)).unwrap(), 60);
		assert_eq!(sf.balance(&addr(2)).unwrap(), 40);
		assert_eq!(sf.nonce(&addr(1)).unwrap(), 1);
	}

	#[test]
	fn transfer_from_unknown_sender_is_rejected_and_atomic() {
		let mut sf = factory();
		sf.create_state(addr(2), 0).unwrap();
		let t = Transfer::new(addr(1), addr(2), 1, 40);
		assert!(sf.commit_state_changes(&[t], &[]).is_err());
		assert_eq!(sf.balance(&addr(2)).unwrap(), 0);
	}

	#[test]
	fn batch_aborts_entirely_on_second_transfer_failure() {
		let mut sf = factory();
		sf.create_state(addr(1), 100).unwrap();
		sf.create_state(addr(2), 0).unwrap();

		let ok = Transfer::new(addr(1), addr(2), 1, 40);
		let bad = Transfer::new(addr(1), addr(2), 99, 40);
		assert!(sf.commit_state_changes(&[ok, bad], &[]).is_err());

		assert_eq!(sf.balance(&addr(1)).unwrap(), 100);
		assert_eq!(sf.balance(&addr(2)).unwrap(), 0);
	}

	#[test]
	fn self_vote_enters_candidate_into_ranker() {
		let mut sf = factory();
		sf.create_state(addr(1), 70).unwrap();
		let vote = Vote::new(0, addr(1), Some(addr(1)));
		sf.commit_state_changes(&[], &[vote]).unwrap();

		let elected = sf.candidates();
		assert_eq!(elected.len(), 1);
		assert_eq!(elected[0].address, addr(1));
		assert_eq!(elected[0].votes, 70);
	}

	#[test]
	fn vote_for_non_candidate_has_no_effect_until_it_becomes_one() {
		let mut sf = factory();
		sf.create_state(addr(1), 100).unwrap();
		sf.create_state(addr(2), 50).unwrap();
		let vote = Vote::new(0, addr(1), Some(addr(2)));
		sf.commit_state_changes(&[], &[vote]).unwrap();

		assert!(sf.candidates().is_empty());
		assert!(sf.candidates_buffer().is_empty());
	}

	#[test]
	fn vote_cast_before_candidacy_counts_once_target_self_votes() {
		let mut sf = factory();
		sf.create_state(addr(1), 100).unwrap();
		sf.create_state(addr(2), 50).unwrap();

		// addr(1) votes for addr(2) while addr(2) is nobody's candidate yet.
		sf.commit_state_changes(&[], &[Vote::new(0, addr(1), Some(addr(2)))]).unwrap();
		// addr(2) later declares candidacy; addr(1)'s earlier vote is still
		// live and counts immediately.
		sf.commit_state_changes(&[], &[Vote::new(0, addr(2), Some(addr(2)))]).unwrap();

		let elected = sf.candidates();
		assert_eq!(elected.len(), 1);
		assert_eq!(elected[0].address, addr(2));
		assert_eq!(elected[0].votes, 150);
	}

	#[test]
	fn moving_vote_away_drops_it_before_target_later_self_votes() {
		let mut sf = factory();
		sf.create_state(addr(1), 100).unwrap();
		sf.create_state(addr(2), 50).unwrap();
		sf.create_state(addr(3), 10).unwrap();

		// addr(1) votes for addr(3) (not yet a candidate)...
		sf.commit_state_changes(&[], &[Vote::new(0, addr(1), Some(addr(3)))]).unwrap();
		// ...then switches to self before addr(3) ever becomes a candidate.
		sf.commit_state_changes(&[], &[Vote::new(1, addr(1), Some(addr(1)))]).unwrap();
		sf.commit_state_changes(&[], &[Vote::new(0, addr(3), Some(addr(3)))]).unwrap();

		let elected = sf.candidates();
		let a = elected.iter().find(|c| c.address == addr(1)).unwrap();
		let c = elected.iter().find(|c| c.address == addr(3)).unwrap();
		assert_eq!(a.votes, 100);
		assert_eq!(c.votes, 10);
	}

	#[test]
	fn vote_reassignment_moves_weight_between_candidates() {
		let mut sf = factory();
		sf.create_state(addr(1), 70).unwrap();
		sf.create_state(addr(2), 210).unwrap();

		sf.commit_state_changes(&[], &[Vote::new(0, addr(1), Some(addr(1)))]).unwrap();
		sf.commit_state_changes(&[], &[Vote::new(0, addr(2), Some(addr(2)))]).unwrap();
		sf.commit_state_changes(&[], &[Vote::new(1, addr(1), Some(addr(2)))]).unwrap();

		let elected = sf.candidates();
		let a = elected.iter().find(|c| c.address == addr(1)).unwrap();
		let b = elected.iter().find(|c| c.address == addr(2)).unwrap();
		assert_eq!(a.votes, 0);
		assert_eq!(b.votes, 280);
	}

	#[test]
	fn withdrawal_zeroes_out_candidate_but_keeps_it_in_buffer() {
		let mut sf = factory();
		sf.create_state(addr(1), 70).unwrap();
		sf.create_state(addr(2), 210).unwrap();
		sf.create_state(addr(3), 320).unwrap();

		sf.commit_state_changes(&[], &[Vote::new(0, addr(1), Some(addr(1)))]).unwrap();
		sf.commit_state_changes(&[], &[Vote::new(0, addr(2), Some(addr(2)))]).unwrap();
		sf.commit_state_changes(&[], &[Vote::new(0, addr(3), Some(addr(3)))]).unwrap();
		sf.commit_state_changes(&[], &[Vote::new(1, addr(1), None)]).unwrap();

		let elected = sf.candidates();
		let buffer = sf.candidates_buffer();
		assert_eq!(elected.len(), 2);
		assert_eq!(buffer.len(), 1);
		assert_eq!(buffer[0].address, addr(1));
		assert_eq!(buffer[0].votes, 0);
	}

	fn as_set(candidates: Vec<crate::candidate::Candidate>) -> HashSet<(Address, u64)> {
		candidates.into_iter().map(|c| (c.address, c.votes)).collect()
	}

	fn sets(pairs: &[(Address, u64)]) -> HashSet<(Address, u64)> {
		pairs.iter().copied().collect()
	}

	/// Replays the six-account, eight-transfer, seventeen-vote sequence used
	/// to exercise candidacy promotion, demotion, vote reassignment and
	/// eviction together, asserting the elected set and runner-up buffer
	/// after every batch. `elected_size=2, buffer_size=4` is the sizing the
	/// sequence itself exercises (four simultaneous buffer entries appear
	/// more than once), not the round numbers quoted loosely elsewhere.
	#[test]
	fn end_to_end_candidate_promotion_demotion_and_vote_reassignment() {
		let (a, b, c, d, e, f) = (addr(1), addr(2), addr(3), addr(4), addr(5), addr(6));
		let mut sf = StateFactory::new(MemTrie::new(), 2, 4);
		sf.create_state(a, 100).unwrap();
		sf.create_state(b, 200).unwrap();
		sf.create_state(c, 300).unwrap();
		sf.create_state(d, 100).unwrap();
		sf.create_state(e, 100).unwrap();
		sf.create_state(f, 300).unwrap();

		// a:100 b:200 c:300 -> a:70 b:210 c:320
		let tx1 = Transfer::new(a, b, 1, 10);
		let tx2 = Transfer::new(a, c, 2, 20);
		sf.commit_state_changes(&[tx1, tx2], &[]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[], &[Vote::new(0, a, Some(a))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 70)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[], &[Vote::new(0, b, Some(b))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 70), (b, 210)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[], &[Vote::new(1, a, Some(b))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 0), (b, 280)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[Transfer::new(b, a, 2, 20)], &[]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 0), (b, 280)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[Transfer::new(a, b, 2, 20)], &[]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 0), (b, 280)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[], &[Vote::new(1, b, Some(a))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 210), (b, 70)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[], &[Vote::new(2, b, Some(b))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 0), (b, 280)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		// idempotent re-vote for self.
		sf.commit_state_changes(&[], &[Vote::new(3, b, Some(b))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 0), (b, 280)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		sf.commit_state_changes(&[Transfer::new(c, a, 2, 20)], &[]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 0), (b, 300)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		// c votes for a: cast while a is already a candidate, so it counts
		// immediately.
		sf.commit_state_changes(&[], &[Vote::new(0, c, Some(a))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 300), (b, 300)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		// b votes for c, which is not yet a candidate: b loses its own
		// self-registration, but the vote to c registers silently.
		sf.commit_state_changes(&[], &[Vote::new(4, b, Some(c))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(a, 300), (b, 90)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[]));

		// c declares candidacy: b's earlier vote (still pointed at c) now
		// counts, and c displaces a from the elected set.
		sf.commit_state_changes(&[], &[Vote::new(1, c, Some(c))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 510), (b, 90)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(a, 0)]));

		// d votes for e, not yet a candidate: no visible effect anywhere.
		sf.commit_state_changes(&[], &[Vote::new(0, d, Some(e))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 510), (b, 90)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(a, 0)]));

		// d switches to self before e ever becomes a candidate, dropping the
		// earlier registration.
		sf.commit_state_changes(&[], &[Vote::new(1, d, Some(d))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 510), (d, 100)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(a, 0), (b, 90)]));

		sf.commit_state_changes(&[], &[Vote::new(2, d, Some(a))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 510), (a, 100)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(d, 0), (b, 90)]));

		sf.commit_state_changes(&[], &[Vote::new(2, c, Some(d))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 210), (d, 300)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(a, 100), (b, 90)]));

		// c switches back to self: b's old vote for c (never withdrawn) and
		// c's own self-registration both still apply.
		sf.commit_state_changes(&[], &[Vote::new(3, c, Some(c))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 510), (a, 100)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(d, 0), (b, 90)]));

		sf.commit_state_changes(&[Transfer::new(c, e, 1, 200), Transfer::new(b, e, 2, 200)], &[]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 110), (a, 100)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(d, 0), (b, 90)]));

		sf.commit_state_changes(&[], &[Vote::new(0, e, Some(e))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 110), (e, 500)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(d, 0), (b, 90), (a, 100)]));

		sf.commit_state_changes(&[], &[Vote::new(0, f, Some(f))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(f, 300), (e, 500)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(c, 110), (b, 90), (a, 100), (d, 0)]));

		sf.commit_state_changes(&[], &[Vote::new(1, f, Some(d))]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(d, 300), (e, 500)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(c, 110), (b, 90), (a, 100), (f, 0)]));

		sf.commit_state_changes(&[Transfer::new(f, b, 1, 200)], &[]).unwrap();
		assert_eq!(as_set(sf.candidates()), sets(&[(c, 310), (e, 500)]));
		assert_eq!(as_set(sf.candidates_buffer()), sets(&[(d, 100), (b, 90), (a, 100), (f, 0)]));
	}
}
