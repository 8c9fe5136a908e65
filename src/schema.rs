table! {
    queues (chat_id) {
        chat_id -> Int8,
        name -> Text,
        users -> Array<Text>,
        admins -> Array<Text>,
        is_active -> Bool,
        cooldown -> Int4,
        who_timestamp -> Timestamptz,
        list_timestamp -> Timestamptz,
        admins_timestamp -> Timestamptz,
        message_id -> Int4,
    }
}
