//! Plain-text output for CLI commands

use solidario::models::{
    Campaign, ChatMessage, HelpRequest, Institution, Notification, Participant, Region, User,
};
use solidario::moderation::{ActionSet, UserRole};

pub fn user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("  id: {}", user.id);
    println!("  role: {}", user.role.as_str());
    if let Some(region) = user.region_id {
        println!("  region: {}", region);
    }
    if let Some(institution) = user.institution_id {
        println!("  institution: {}", institution);
    }
}

pub fn campaigns(campaigns: &[Campaign], role: UserRole) {
    if campaigns.is_empty() {
        println!("No campaigns found.");
        return;
    }

    println!("Campaigns:");
    println!("{:─<72}", "");
    for campaign in campaigns {
        let state = if campaign.status.is_pending() || campaign.status.is_terminal() {
            campaign.status.to_string()
        } else if campaign.active {
            format!("{} (ativa)", campaign.status)
        } else {
            format!("{} (pausada)", campaign.status)
        };

        println!("  {:>5}  {:<32} {}", campaign.id, campaign.title, state);

        let actions = campaign.allowed_actions(role);
        if !actions.is_empty() {
            println!("         actions: {}", labels(&actions));
        }
    }
}

pub fn actions(campaign_id: i64, actions: &ActionSet) {
    if actions.is_empty() {
        println!("No actions available for campaign {}.", campaign_id);
    } else {
        println!("Campaign {}: {}", campaign_id, labels(actions));
    }
}

fn labels(actions: &ActionSet) -> String {
    actions
        .iter()
        .map(|a| a.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn participants(participants: &[Participant]) {
    if participants.is_empty() {
        println!("No participants.");
        return;
    }

    for p in participants {
        match &p.exit_reason {
            Some(reason) => println!(
                "  {:>5}  {:<28} {} ({})",
                p.id,
                p.name,
                p.status.as_str(),
                reason
            ),
            None => println!("  {:>5}  {:<28} {}", p.id, p.name, p.status.as_str()),
        }
    }
}

pub fn notifications(notifications: &[Notification]) {
    if notifications.is_empty() {
        println!("No notifications.");
        return;
    }

    for n in notifications {
        let marker = if n.read { ' ' } else { '*' };
        let when = n
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{} {:>5}  {:<16} {}  {}", marker, n.id, when, n.kind, n.message);

        if n.is_delegation() {
            match n.delegation_status {
                Some(status) if status.is_terminal() => {
                    println!("         delegation {}", status.as_str())
                }
                _ => println!(
                    "         delegation pending: `notifications respond {} --accept|--decline`",
                    n.id
                ),
            }
        }
    }
}

pub fn institutions(institutions: &[Institution]) {
    if institutions.is_empty() {
        println!("No institutions.");
        return;
    }

    for i in institutions {
        println!("  {:>5}  {:<32} {}", i.id, i.name, i.status.as_str());
    }
}

pub fn regions(regions: &[Region]) {
    for r in regions {
        println!(
            "  {:>5}  {:<32} {} moderator(s)",
            r.id,
            r.name,
            r.moderator_ids.len()
        );
    }
}

pub fn users(users: &[User]) {
    for u in users {
        println!("  {:>5}  {:<28} {:<32} {}", u.id, u.name, u.email, u.role.as_str());
    }
}

pub fn help_requests(requests: &[HelpRequest]) {
    if requests.is_empty() {
        println!("No help requests.");
        return;
    }

    for r in requests {
        println!("  {:>5}  {:<32} {}", r.id, r.title, r.status);
    }
}

pub fn chat(messages: &[ChatMessage]) {
    for m in messages {
        let author = m
            .author_name
            .clone()
            .unwrap_or_else(|| format!("#{}", m.author_id));
        let when = m
            .sent_at
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        println!("[{}] {}: {}", when, author, m.content);
    }
}
