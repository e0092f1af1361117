use diesel::prelude::*;

table! {
    companies (id) {
        id -> Uuid,
        name -> Text,
        chatwork_room_id -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    staff_members (id) {
        id -> Uuid,
        company_id -> Nullable<Uuid>,
        name -> Text,
        department -> Nullable<Text>,
        chatwork_id -> Nullable<Text>,
        photo_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    chatwork_settings (id) {
        id -> Uuid,
        api_key -> Text,
        message_template -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    walkin_settings (id) {
        id -> Uuid,
        chatwork_room_id -> Text,
        message_template -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    visitor_logs (id) {
        id -> Uuid,
        visitor_name -> Text,
        visitor_company -> Text,
        staff_member_id -> Nullable<Uuid>,
        has_appointment -> Bool,
        created_at -> Timestamptz,
    }
}

table! {
    error_logs (id) {
        id -> Uuid,
        error_message -> Text,
        error_stack -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

joinable!(staff_members -> companies (company_id));
joinable!(visitor_logs -> staff_members (staff_member_id));

allow_tables_to_appear_in_same_query!(
    companies,
    staff_members,
    chatwork_settings,
    walkin_settings,
    visitor_logs,
    error_logs,
);
