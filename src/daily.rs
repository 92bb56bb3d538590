use chrono::{DateTime, Datelike, Local};

use crate::models::Message;

/// A blessing from the built-in catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blessing {
    pub text: &'static str,
    pub category: &'static str,
}

pub const BLESSINGS: &[Blessing] = &[
    Blessing {
        text: "Your potential is God's promise to you. Trust in His timing, work with dedication, and watch miracles unfold in your life.",
        category: "Faith & Motivation",
    },
    Blessing {
        text: "Faith does not make things easy, it makes them possible. Walk forward today knowing you are not alone.",
        category: "Faith",
    },
    Blessing {
        text: "Small steps taken daily build the road to great things. Begin where you are and keep going.",
        category: "Motivation",
    },
    Blessing {
        text: "Be a good steward of what you have today, and you will be trusted with more tomorrow.",
        category: "Financial",
    },
    Blessing {
        text: "Rest is not a reward for finished work, it is part of the work. Care for the body you have been given.",
        category: "Health",
    },
    Blessing {
        text: "Speak kindly, forgive quickly, and love the people around you as you would want to be loved.",
        category: "Relationships",
    },
];

/// Blessing for the given day, rotating through the catalogue by day of year
pub fn blessing_for(now: DateTime<Local>) -> Blessing {
    let index = now.ordinal0() as usize % BLESSINGS.len();
    BLESSINGS[index]
}

/// Today's blessing as an archivable message stamped with `now`
pub fn todays_message(now: DateTime<Local>) -> Message {
    let blessing = blessing_for(now);
    Message::new(
        now.to_rfc3339(),
        blessing.text.to_string(),
        blessing.category.to_string(),
        now.format("%Y-%m-%d").to_string(),
    )
}
