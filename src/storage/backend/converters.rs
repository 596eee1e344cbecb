//! 数据库行与领域模型的互转

use sea_orm::ActiveValue::Set;

use crate::storage::models::{ClickRecord, Link, NewLink, Owner, Plan};
use migration::entities::{click, link, owner};

pub fn model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        owner_id: model.owner_id,
        token: model.token,
        destination: model.destination,
        title: model.title,
        description: model.description,
        created_at: model.created_at,
        expires_at: model.expires_at,
        max_clicks: model.max_clicks.map(|v| v.max(0) as u32),
        click_count: model.click_count.max(0) as u64,
        is_active: model.is_active,
    }
}

pub fn link_to_model(link: &Link) -> link::Model {
    link::Model {
        id: link.id.clone(),
        owner_id: link.owner_id.clone(),
        token: link.token.clone(),
        destination: link.destination.clone(),
        title: link.title.clone(),
        description: link.description.clone(),
        created_at: link.created_at,
        expires_at: link.expires_at,
        max_clicks: link.max_clicks.map(|v| v as i32),
        click_count: link.click_count as i64,
        is_active: link.is_active,
    }
}

pub fn new_link_to_active_model(new_link: &NewLink) -> link::ActiveModel {
    link::ActiveModel {
        id: Set(new_link.id.clone()),
        owner_id: Set(new_link.owner_id.clone()),
        token: Set(new_link.token.clone()),
        destination: Set(new_link.destination.clone()),
        title: Set(new_link.title.clone()),
        description: Set(new_link.description.clone()),
        created_at: Set(new_link.created_at),
        expires_at: Set(new_link.expires_at),
        max_clicks: Set(new_link.max_clicks.map(|v| v as i32)),
        click_count: Set(0),
        is_active: Set(new_link.is_active),
    }
}

pub fn model_to_owner(model: owner::Model) -> Owner {
    // 未知的 plan 字符串按 free 处理，limit 以行内值为准
    let plan = Plan::parse(&model.plan).unwrap_or(Plan::Free);
    Owner {
        id: model.id,
        plan,
        link_limit: model.link_limit.max(0) as u32,
        active_link_count: model.active_link_count.max(0) as u32,
        created_at: model.created_at,
    }
}

pub fn click_to_record(model: click::Model) -> ClickRecord {
    ClickRecord {
        id: model.id,
        link_id: model.link_id,
        occurred_at: model.occurred_at,
        ip_address: model.ip_address,
        country: model.country,
        city: model.city,
        referrer: model.referrer,
        user_agent: model.user_agent,
        device_type: model.device_type,
        browser: model.browser,
        os: model.os,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_model() -> link::Model {
        link::Model {
            id: "l-1".to_string(),
            owner_id: "o-1".to_string(),
            token: "aB3xY9z".to_string(),
            destination: "https://example.com".to_string(),
            title: Some("Example".to_string()),
            description: None,
            created_at: Utc::now(),
            expires_at: None,
            max_clicks: Some(10),
            click_count: 3,
            is_active: true,
        }
    }

    #[test]
    fn test_link_round_trip() {
        let model = sample_model();
        let link = model_to_link(model.clone());
        assert_eq!(link.max_clicks, Some(10));
        assert_eq!(link.click_count, 3);

        let back = link_to_model(&link);
        assert_eq!(back, model);
    }

    #[test]
    fn test_negative_counters_clamp_to_zero() {
        let mut model = sample_model();
        model.click_count = -5;
        model.max_clicks = Some(-1);
        let link = model_to_link(model);
        assert_eq!(link.click_count, 0);
        assert_eq!(link.max_clicks, Some(0));
    }

    #[test]
    fn test_unknown_plan_falls_back_to_free() {
        let owner = model_to_owner(owner::Model {
            id: "o-1".to_string(),
            plan: "enterprise".to_string(),
            link_limit: 500,
            active_link_count: 2,
            created_at: Utc::now(),
        });
        assert_eq!(owner.plan, Plan::Free);
        // limit 来自行内值，不跟随回退后的 plan
        assert_eq!(owner.link_limit, 500);
    }

    #[test]
    fn test_new_link_starts_with_zero_clicks() {
        let am = new_link_to_active_model(&NewLink {
            id: "l-2".to_string(),
            owner_id: "o-1".to_string(),
            token: "zZ9aA1b".to_string(),
            destination: "https://example.org".to_string(),
            title: None,
            description: None,
            created_at: Utc::now(),
            expires_at: None,
            max_clicks: None,
            is_active: true,
        });
        assert_eq!(am.click_count, Set(0));
    }
}
