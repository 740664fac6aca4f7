// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Write actions.
//!
//! Each action invokes the bound handle exactly once and hands back the
//! remote outcome:
//!
//! - `Ok(Ok(_))`: the remote accepted the action
//! - `Ok(Err(rejection))`: the remote refused it; show `rejection` as is
//! - `Err(_)`: transport failure, left to the caller to report

use tracing::{info, warn};

use super::dao::{DaoActor, TokenActor};
use crate::actor::{ActorError, Agent, Reply};
use crate::identity::Principal;
use crate::models::{ProposalContent, Vote};
use crate::session::{Action, Profile, SessionStore};

pub struct Governance<A> {
    pub(super) dao: DaoActor<A>,
    pub(super) token: TokenActor<A>,
    pub(super) session: SessionStore,
}

impl<A> Clone for Governance<A> {
    fn clone(&self) -> Self {
        Self {
            dao: self.dao.clone(),
            token: self.token.clone(),
            session: self.session.clone(),
        }
    }
}

fn log_outcome<T>(action: &'static str, reply: &Reply<T>) {
    match reply {
        Ok(_) => info!(action, "Remote action accepted"),
        Err(rejection) => warn!(action, reason = %rejection, "Remote action rejected"),
    }
}

impl<A: Agent> Governance<A> {
    pub fn new(dao: DaoActor<A>, token: TokenActor<A>, session: SessionStore) -> Self {
        Self {
            dao,
            token,
            session,
        }
    }

    pub fn dao(&self) -> &DaoActor<A> {
        &self.dao
    }

    /// Register the caller as a member.
    ///
    /// On success the new member record is fetched and signed in, so the
    /// session reflects the membership right away. A failed refresh is
    /// logged; the registration outcome is still returned.
    pub async fn register_member(&self, name: &str, github: &str) -> Result<Reply<()>, ActorError> {
        let reply = self.dao.register_member(name, github).await?;
        log_outcome("registerMember", &reply);
        if reply.is_err() {
            return Ok(reply);
        }

        let principal = self.dao.handle().current_principal();
        match self.dao.get_member(&principal).await {
            Ok(Ok(member)) => {
                self.session.dispatch(Action::Login(Profile {
                    principal,
                    member: Some(member),
                }));
            }
            Ok(Err(rejection)) => {
                warn!(%principal, reason = %rejection, "Registered member not found on refresh");
            }
            Err(e) => {
                warn!(%principal, error = %e, "Failed to refresh member after registration");
            }
        }
        Ok(reply)
    }

    pub async fn create_project(&self, name: &str, url: &str) -> Result<Reply<()>, ActorError> {
        let reply = self.dao.create_project(name, url).await?;
        log_outcome("createProject", &reply);
        Ok(reply)
    }

    /// Submit the caller's work for a project.
    pub async fn submit_project(&self, project_id: u64, github: &str) -> Result<Reply<()>, ActorError> {
        let reply = self.dao.create_submission(project_id, github).await?;
        log_outcome("createSubmission", &reply);
        Ok(reply)
    }

    pub async fn create_proposal(&self, content: &ProposalContent) -> Result<Reply<()>, ActorError> {
        let reply = self.dao.create_proposal(content).await?;
        log_outcome("createProposal", &reply);
        Ok(reply)
    }

    /// Vote on a proposal as the principal the handle is bound to.
    pub async fn vote(&self, proposal_id: u64, yes_or_no: bool) -> Result<Reply<()>, ActorError> {
        let vote = Vote {
            member: self.dao.handle().current_principal(),
            yes_or_no,
        };
        let reply = self.dao.vote_proposal(proposal_id, &vote).await?;
        log_outcome("voteProposal", &reply);
        Ok(reply)
    }

    /// Promote a student to graduate.
    pub async fn graduate(&self, member: &Principal) -> Result<Reply<()>, ActorError> {
        let reply = self.dao.graduate(member).await?;
        log_outcome("graduate", &reply);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::mock::MockAgent;
    use crate::actor::{ActorHandle, Rejection};
    use crate::identity::{Identity, SessionKey};
    use serde_json::json;
    use std::sync::Arc;

    fn governance() -> (Governance<MockAgent>, Arc<MockAgent>, SessionStore) {
        let agent = Arc::new(MockAgent::new());
        let dao = ActorHandle::new(agent.clone(), Principal::management());
        let token = dao.for_canister(Principal::anonymous());
        let session = SessionStore::new();
        let governance = Governance::new(DaoActor::new(dao), TokenActor::new(token), session.clone());
        (governance, agent, session)
    }

    fn signed_in(agent: &MockAgent) -> Principal {
        let identity = Arc::new(Identity::Basic(SessionKey::generate().unwrap()));
        let principal = identity.principal();
        agent.replace_identity(identity).unwrap();
        principal
    }

    #[tokio::test]
    async fn register_member_signs_in_the_new_member() {
        let (governance, agent, session) = governance();
        let principal = signed_in(&agent);
        agent.reply("registerMember", json!({ "ok": null }));
        agent.reply(
            "getMember",
            json!({ "ok": {
                "name": "Ada",
                "github": "ada-repo",
                "role": { "Student": null },
                "principal": principal.to_text()
            }}),
        );

        let reply = governance.register_member("Ada", "ada-repo").await.unwrap();

        assert_eq!(reply, Ok(()));
        assert_eq!(session.transitions(), 1);
        let state = session.state();
        assert_eq!(state.user().map(|u| &u.principal), Some(&principal));
        assert_eq!(state.member().map(|m| m.name.as_str()), Some("Ada"));
        assert_eq!(agent.calls_to("registerMember"), 1);
    }

    #[tokio::test]
    async fn rejected_registration_dispatches_nothing() {
        let (governance, agent, session) = governance();
        signed_in(&agent);
        agent.reply("registerMember", json!({ "err": "taken" }));

        let reply = governance.register_member("Ada", "ada-repo").await.unwrap();

        assert_eq!(reply, Err(Rejection("taken".into())));
        assert_eq!(session.transitions(), 0);
        assert!(!session.state().is_authenticated());
        assert_eq!(agent.calls_to("getMember"), 0);
    }

    #[tokio::test]
    async fn registration_without_member_record_stays_signed_out() {
        let (governance, agent, session) = governance();
        signed_in(&agent);
        agent.reply("registerMember", json!({ "ok": null }));
        agent.reply("getMember", json!({ "err": "Member not found" }));

        let reply = governance.register_member("Ada", "ada-repo").await.unwrap();

        assert_eq!(reply, Ok(()));
        assert_eq!(session.transitions(), 0);
    }

    #[tokio::test]
    async fn registration_survives_a_failed_refresh() {
        let (governance, agent, session) = governance();
        signed_in(&agent);
        agent.reply("registerMember", json!({ "ok": null }));
        agent.unavailable("getMember");

        let reply = governance.register_member("Ada", "ada-repo").await.unwrap();

        assert_eq!(reply, Ok(()));
        assert_eq!(agent.calls_to("getMember"), 1);
        assert_eq!(session.transitions(), 0);
    }

    #[tokio::test]
    async fn transport_failure_propagates_without_retry() {
        let (governance, agent, session) = governance();
        agent.unavailable("createProject");

        let result = governance.create_project("WeGrow", "https://github.com/wegrow").await;

        assert!(matches!(result, Err(ActorError::Status { status: 503, .. })));
        assert_eq!(agent.calls_to("createProject"), 1);
        assert_eq!(session.transitions(), 0);
    }

    #[tokio::test]
    async fn vote_is_cast_as_the_bound_principal() {
        let (governance, agent, _session) = governance();
        let principal = signed_in(&agent);
        agent.reply("voteProposal", json!({ "ok": null }));

        governance.vote(3, false).await.unwrap().unwrap();

        assert_eq!(
            agent.calls()[0].args,
            json!([3, { "member": principal.to_text(), "yesOrNo": false }])
        );
    }

    #[tokio::test]
    async fn each_write_action_calls_its_method_once() {
        let (governance, agent, _session) = governance();
        for method in ["createSubmission", "createProposal", "graduate"] {
            agent.reply(method, json!({ "ok": null }));
        }

        governance.submit_project(1, "https://github.com/ada/repo").await.unwrap().unwrap();
        governance
            .create_proposal(&ProposalContent::AddMentor(Principal::anonymous()))
            .await
            .unwrap()
            .unwrap();
        governance.graduate(&Principal::anonymous()).await.unwrap().unwrap();

        let methods: Vec<String> = agent.calls().into_iter().map(|c| c.method).collect();
        assert_eq!(methods, ["createSubmission", "createProposal", "graduate"]);
    }
}
