// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Remote Data Models
//!
//! Records owned by the governance and token canisters. The client never
//! mutates them; every change goes through [`crate::api::Governance`].
//!
//! ## Wire Format
//!
//! Field names follow the remote's camelCase. Variant types without a
//! payload are single-key objects (`{"Student": null}`), variants with a
//! payload carry it as the value (`{"ChangeManifesto": "..."}`).
//!
//! ## Model Categories
//!
//! - **Members**: roster entries and their roles
//! - **Proposals**: governance change requests and their votes
//! - **Projects**: mentor-created projects and member submissions

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::identity::Principal;

fn serialize_tag<S: Serializer>(tag: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(tag, &())?;
    map.end()
}

// =============================================================================
// Member Models
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Role {
    Student,
    Graduate,
    Mentor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Graduate, Role::Mentor];

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Graduate => "Graduate",
            Role::Mentor => "Mentor",
        }
    }

    /// Parse a role from its label, as used in the members filter.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.label() == label)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tag(self.label(), serializer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// GitHub handle or repository
    pub github: String,
    pub role: Role,
    pub principal: Principal,
}

impl Member {
    /// Only students can be promoted.
    pub fn can_graduate(&self) -> bool {
        self.role == Role::Student
    }
}

// =============================================================================
// Proposal Models
// =============================================================================

/// What a proposal changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalContent {
    ChangeManifesto(String),
    AddMentor(Principal),
}

impl ProposalContent {
    /// Human readable proposal type.
    pub fn kind_label(&self) -> &'static str {
        match self {
            ProposalContent::ChangeManifesto(_) => "Change Manifesto",
            ProposalContent::AddMentor(_) => "Add Mentor",
        }
    }

    /// The proposed manifesto, or the text form of the proposed mentor.
    pub fn text(&self) -> String {
        match self {
            ProposalContent::ChangeManifesto(manifesto) => manifesto.clone(),
            ProposalContent::AddMentor(principal) => principal.to_text(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProposalStatus {
    Open,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProposalStatus::Open => "Open",
            ProposalStatus::Accepted => "Accepted",
            ProposalStatus::Rejected => "Rejected",
        }
    }
}

impl Serialize for ProposalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tag(self.label(), serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub member: Principal,
    pub yes_or_no: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteCounts {
    pub approves: usize,
    pub rejects: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: u64,
    pub creator: Principal,
    /// Creation time, nanoseconds since the Unix epoch
    pub created: u64,
    pub content: ProposalContent,
    pub status: ProposalStatus,
    pub votes: Vec<Vote>,
    pub vote_score: i64,
    #[serde(default)]
    pub executed: Option<u64>,
}

impl Proposal {
    pub fn vote_counts(&self) -> VoteCounts {
        self.votes.iter().fold(VoteCounts::default(), |mut counts, vote| {
            if vote.yes_or_no {
                counts.approves += 1;
            } else {
                counts.rejects += 1;
            }
            counts
        })
    }

    pub fn has_voted(&self, member: &Principal) -> bool {
        self.votes.iter().any(|vote| &vote.member == member)
    }
}

// =============================================================================
// Project Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub mentor: Principal,
}

/// A member's submission for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Project id
    pub project: u64,
    pub url: String,
}

// =============================================================================
// Aggregates
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub name: String,
    pub manifesto: String,
    pub number_of_members: u64,
    #[serde(default)]
    pub number_of_proposals: u64,
}

/// Everything the member detail page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberDetail {
    pub principal: Principal,
    pub member: Option<Member>,
    pub submissions: Vec<Submission>,
    pub balance: u64,
    pub token_symbol: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ada() -> Member {
        Member {
            name: "Ada".into(),
            github: "ada-repo".into(),
            role: Role::Student,
            principal: Principal::anonymous(),
        }
    }

    fn proposal(votes: &[bool]) -> Proposal {
        Proposal {
            id: 1,
            creator: Principal::anonymous(),
            created: 0,
            content: ProposalContent::ChangeManifesto("Grow together".into()),
            status: ProposalStatus::Open,
            votes: votes
                .iter()
                .map(|&yes_or_no| Vote {
                    member: Principal::anonymous(),
                    yes_or_no,
                })
                .collect(),
            vote_score: 0,
            executed: None,
        }
    }

    #[test]
    fn role_uses_single_key_variant_on_the_wire() {
        let json = serde_json::to_value(ada()).unwrap();
        assert_eq!(json["role"], json!({ "Student": null }));

        let member: Member = serde_json::from_value(json).unwrap();
        assert_eq!(member, ada());
    }

    #[test]
    fn role_labels_round_trip_for_filters() {
        for role in Role::ALL {
            assert_eq!(Role::from_label(role.label()), Some(role));
        }
        assert_eq!(Role::from_label("student"), None);
    }

    #[test]
    fn proposal_decodes_remote_shape() {
        let json = json!({
            "id": 7,
            "creator": "2vxsx-fae",
            "created": 1_700_000_000_000_000_000u64,
            "content": { "AddMentor": "aaaaa-aa" },
            "status": { "Accepted": null },
            "votes": [{ "member": "2vxsx-fae", "yesOrNo": true }],
            "voteScore": 1,
            "executed": null
        });
        let proposal: Proposal = serde_json::from_value(json).unwrap();
        assert_eq!(proposal.content, ProposalContent::AddMentor(Principal::management()));
        assert_eq!(proposal.status, ProposalStatus::Accepted);
        assert_eq!(proposal.executed, None);
        assert_eq!(proposal.content.text(), "aaaaa-aa");
        assert_eq!(proposal.content.kind_label(), "Add Mentor");
    }

    #[test]
    fn vote_counts_split_approves_and_rejects() {
        let counts = proposal(&[true, false, true]).vote_counts();
        assert_eq!(counts, VoteCounts { approves: 2, rejects: 1 });
        assert_eq!(proposal(&[]).vote_counts(), VoteCounts::default());
    }

    #[test]
    fn only_students_can_graduate() {
        assert!(ada().can_graduate());
        let mentor = Member { role: Role::Mentor, ..ada() };
        assert!(!mentor.can_graduate());
    }
}
