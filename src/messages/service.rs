use std::collections::HashMap;

use uuid::Uuid;

use crate::messages::repo::Message;

/// The other participant of a message, relative to `user_id`. A self-send
/// has the user as its own counterpart.
pub(crate) fn counterpart(user_id: Uuid, message: &Message) -> Uuid {
    if message.sender_id == user_id {
        message.recipient_id
    } else {
        message.sender_id
    }
}

/// Group a flat message log into one (counterpart, last message) entry per
/// distinct counterpart, ordered by last-message timestamp descending.
///
/// Input is expected oldest-first; within a group a later element wins a
/// timestamp tie, so the ordering the repo provides (created_at, then id)
/// makes the result deterministic. The final sort is stable, so counterparts
/// whose last messages tie keep first-contact order.
pub(crate) fn group_conversations(user_id: Uuid, messages: Vec<Message>) -> Vec<(Uuid, Message)> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut last: HashMap<Uuid, Message> = HashMap::new();

    for message in messages {
        let other = counterpart(user_id, &message);
        let replace = match last.get(&other) {
            Some(existing) => message.created_at >= existing.created_at,
            None => {
                order.push(other);
                true
            }
        };
        if replace {
            last.insert(other, message);
        }
    }

    let mut out: Vec<(Uuid, Message)> = order
        .into_iter()
        .filter_map(|id| last.remove(&id).map(|msg| (id, msg)))
        .collect();
    out.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};

    fn msg(sender: Uuid, recipient: Uuid, at: OffsetDateTime) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: sender,
            recipient_id: recipient,
            content: "hi".into(),
            sneaker_id: None,
            created_at: at,
        }
    }

    #[test]
    fn counterpart_is_the_other_party() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let t = OffsetDateTime::now_utc();
        assert_eq!(counterpart(a, &msg(a, b, t)), b);
        assert_eq!(counterpart(a, &msg(b, a, t)), b);
        assert_eq!(counterpart(a, &msg(a, a, t)), a);
    }

    #[test]
    fn empty_log_yields_no_conversations() {
        let grouped = group_conversations(Uuid::new_v4(), vec![]);
        assert!(grouped.is_empty());
    }

    #[test]
    fn one_entry_per_counterpart_most_recent_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let t1 = OffsetDateTime::now_utc();
        let t2 = t1 + Duration::minutes(1);
        let t3 = t1 + Duration::minutes(2);

        // A->B at t1, B->A at t2, C->A at t3: exactly [C, B] with last
        // messages t3 and t2.
        let grouped = group_conversations(a, vec![msg(a, b, t1), msg(b, a, t2), msg(c, a, t3)]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, c);
        assert_eq!(grouped[0].1.created_at, t3);
        assert_eq!(grouped[1].0, b);
        assert_eq!(grouped[1].1.created_at, t2);
    }

    #[test]
    fn later_message_wins_timestamp_tie_within_group() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let t = OffsetDateTime::now_utc();
        let first = msg(a, b, t);
        let second = msg(b, a, t);
        let second_id = second.id;

        let grouped = group_conversations(a, vec![first, second]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].1.id, second_id);
    }

    #[test]
    fn tie_between_counterparts_keeps_first_contact_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let t = OffsetDateTime::now_utc();

        let grouped = group_conversations(a, vec![msg(b, a, t), msg(c, a, t)]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, b);
        assert_eq!(grouped[1].0, c);
    }

    #[test]
    fn self_messages_form_their_own_conversation() {
        let a = Uuid::new_v4();
        let t = OffsetDateTime::now_utc();
        let grouped = group_conversations(a, vec![msg(a, a, t)]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].0, a);
    }
}
