use diesel::prelude::*;

use crate::models::{Message, NewMessage};
use crate::schema::messages;

/// Two-party conversation, both directions, oldest first. The result is the
/// same set regardless of which participant asks.
pub fn conversation_between(
    conn: &mut PgConnection,
    user_id: &str,
    other_id: &str,
) -> QueryResult<Vec<Message>> {
    messages::table
        .filter(
            messages::sender_id
                .eq(user_id)
                .and(messages::receiver_id.eq(other_id))
                .or(messages::sender_id
                    .eq(other_id)
                    .and(messages::receiver_id.eq(user_id))),
        )
        .order(messages::created_at.asc())
        .load(conn)
}

pub fn messages_for_order(conn: &mut PgConnection, order_id: &str) -> QueryResult<Vec<Message>> {
    messages::table
        .filter(messages::order_id.eq(order_id))
        .order(messages::created_at.asc())
        .load(conn)
}

pub fn messages_for_participant(
    conn: &mut PgConnection,
    user_id: &str,
) -> QueryResult<Vec<Message>> {
    messages::table
        .filter(
            messages::sender_id
                .eq(user_id)
                .or(messages::receiver_id.eq(user_id)),
        )
        .order(messages::created_at.asc())
        .load(conn)
}

pub fn create_message(conn: &mut PgConnection, message: &NewMessage) -> QueryResult<Message> {
    diesel::insert_into(messages::table)
        .values(message)
        .get_result(conn)
}

/// Marks everything the given sender wrote to the receiver as read and
/// returns how many rows changed.
pub fn mark_messages_read(
    conn: &mut PgConnection,
    receiver_id: &str,
    sender_id: &str,
) -> QueryResult<usize> {
    diesel::update(
        messages::table.filter(
            messages::receiver_id
                .eq(receiver_id)
                .and(messages::sender_id.eq(sender_id))
                .and(messages::is_read.eq(false)),
        ),
    )
    .set(messages::is_read.eq(true))
    .execute(conn)
}
