// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read operations backing the dashboard pages.

use super::governance::Governance;
use crate::actor::{ActorError, Agent};
use crate::identity::Principal;
use crate::models::{Member, MemberDetail, Project, Proposal, Stats};
use crate::routes::MembersQuery;

/// Apply the roster filters: name substring (case-insensitive), then role.
pub fn filter_members(
    members: Vec<(Principal, Member)>,
    query: &MembersQuery,
) -> Vec<(Principal, Member)> {
    let search = query.search.as_ref().map(|s| s.to_lowercase());
    members
        .into_iter()
        .filter(|(_, member)| {
            search
                .as_ref()
                .is_none_or(|search| member.name.to_lowercase().contains(search.as_str()))
        })
        .filter(|(_, member)| query.role.is_none_or(|role| member.role == role))
        .collect()
}

impl<A: Agent> Governance<A> {
    pub async fn stats(&self) -> Result<Stats, ActorError> {
        self.dao.get_stats().await
    }

    pub async fn members(&self, query: &MembersQuery) -> Result<Vec<(Principal, Member)>, ActorError> {
        let members = self.dao.get_members().await?;
        Ok(filter_members(members, query))
    }

    /// Member page data. `member` is `None` when the principal is not
    /// registered.
    pub async fn member_detail(&self, principal: &Principal) -> Result<MemberDetail, ActorError> {
        let member = self.dao.get_member(principal).await?.ok();
        let submissions = self.dao.get_submissions(principal).await?;
        let balance = self.token.balance_of(principal).await?;
        let token_symbol = self.token.token_symbol().await?;
        Ok(MemberDetail {
            principal: principal.clone(),
            member,
            submissions,
            balance,
            token_symbol,
        })
    }

    pub async fn proposals(&self) -> Result<Vec<Proposal>, ActorError> {
        self.dao.get_all_proposal().await
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ActorError> {
        self.dao.get_all_projects().await
    }

    /// The signed-in user's own page, or `None` while signed out.
    pub async fn profile(&self) -> Result<Option<MemberDetail>, ActorError> {
        let Some(user) = self.session.state().user().cloned() else {
            return Ok(None);
        };
        let submissions = self.dao.get_submissions(&user.principal).await?;
        let balance = self.token.balance_of(&user.principal).await?;
        let token_symbol = self.token.token_symbol().await?;
        Ok(Some(MemberDetail {
            principal: user.principal,
            member: user.member,
            submissions,
            balance,
            token_symbol,
        }))
    }
}
