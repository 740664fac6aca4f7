// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed bindings for the governance (DAO) and token canisters.
//!
//! Arguments go out as positional JSON arrays. Methods answering with an
//! `{ok} | {err}` union return [`Reply`]; plain queries return the value.

use serde::de::IgnoredAny;
use serde::Serialize;
use serde_json::Value;

use crate::actor::{ActorError, ActorHandle, Agent, Reply};
use crate::identity::Principal;
use crate::models::{Member, Project, Proposal, ProposalContent, Stats, Submission, Vote};

fn args(values: impl Serialize) -> Result<Value, ActorError> {
    Ok(serde_json::to_value(values)?)
}

fn no_args() -> Value {
    Value::Array(Vec::new())
}

/// Drop whatever the `ok` arm carries.
fn acknowledged(reply: Reply<IgnoredAny>) -> Reply<()> {
    reply.map(|_| ())
}

pub struct DaoActor<A> {
    handle: ActorHandle<A>,
}

impl<A> Clone for DaoActor<A> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<A: Agent> DaoActor<A> {
    pub fn new(handle: ActorHandle<A>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ActorHandle<A> {
        &self.handle
    }

    pub async fn get_member(&self, principal: &Principal) -> Result<Reply<Member>, ActorError> {
        self.handle.query_reply("getMember", args((principal,))?).await
    }

    pub async fn get_members(&self) -> Result<Vec<(Principal, Member)>, ActorError> {
        self.handle.query("getMembers", no_args()).await
    }

    pub async fn register_member(&self, name: &str, github: &str) -> Result<Reply<()>, ActorError> {
        let reply = self
            .handle
            .update_reply("registerMember", args((name, github))?)
            .await?;
        Ok(acknowledged(reply))
    }

    pub async fn graduate(&self, principal: &Principal) -> Result<Reply<()>, ActorError> {
        let reply = self.handle.update_reply("graduate", args((principal,))?).await?;
        Ok(acknowledged(reply))
    }

    pub async fn create_project(&self, name: &str, url: &str) -> Result<Reply<()>, ActorError> {
        let reply = self
            .handle
            .update_reply("createProject", args((name, url))?)
            .await?;
        Ok(acknowledged(reply))
    }

    pub async fn create_submission(&self, project_id: u64, url: &str) -> Result<Reply<()>, ActorError> {
        let reply = self
            .handle
            .update_reply("createSubmission", args((project_id, url))?)
            .await?;
        Ok(acknowledged(reply))
    }

    pub async fn get_all_projects(&self) -> Result<Vec<Project>, ActorError> {
        self.handle.query("getAllProjects", no_args()).await
    }

    /// Submissions of a member, addressed by principal text.
    pub async fn get_submissions(&self, principal: &Principal) -> Result<Vec<Submission>, ActorError> {
        self.handle
            .query("getSubmissions", args((principal.to_text(),))?)
            .await
    }

    pub async fn create_proposal(&self, content: &ProposalContent) -> Result<Reply<()>, ActorError> {
        let reply = self
            .handle
            .update_reply("createProposal", args((content,))?)
            .await?;
        Ok(acknowledged(reply))
    }

    pub async fn vote_proposal(&self, proposal_id: u64, vote: &Vote) -> Result<Reply<()>, ActorError> {
        let reply = self
            .handle
            .update_reply("voteProposal", args((proposal_id, vote))?)
            .await?;
        Ok(acknowledged(reply))
    }

    pub async fn get_all_proposal(&self) -> Result<Vec<Proposal>, ActorError> {
        self.handle.query("getAllProposal", no_args()).await
    }

    pub async fn get_stats(&self) -> Result<Stats, ActorError> {
        self.handle.query("getStats", no_args()).await
    }
}

pub struct TokenActor<A> {
    handle: ActorHandle<A>,
}

impl<A> Clone for TokenActor<A> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<A: Agent> TokenActor<A> {
    pub fn new(handle: ActorHandle<A>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ActorHandle<A> {
        &self.handle
    }

    pub async fn balance_of(&self, owner: &Principal) -> Result<u64, ActorError> {
        self.handle.query("balanceOf", args((owner,))?).await
    }

    pub async fn token_symbol(&self) -> Result<String, ActorError> {
        self.handle.query("tokenSymbol", no_args()).await
    }
}
