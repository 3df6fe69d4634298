// Ids are stored as 16 byte UUID blobs, user ids as provider-issued text.

pub(crate) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id BLOB PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        description TEXT,
        price_cents INTEGER NOT NULL,
        stripe_product_id TEXT,
        stripe_price_id TEXT,
        thumbnail_url TEXT,
        published BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS course_content (
        id BLOB PRIMARY KEY NOT NULL,
        course_id BLOB NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        content_type TEXT NOT NULL CHECK (content_type IN ('video', 'pdf')),
        content_url TEXT NOT NULL,
        order_index INTEGER NOT NULL,
        duration_seconds INTEGER NOT NULL DEFAULT 0,
        is_preview BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_course_content_course ON course_content(course_id, order_index)",
    r#"
    CREATE TABLE IF NOT EXISTS purchases (
        id BLOB PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        course_id BLOB NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        stripe_payment_intent_id TEXT,
        stripe_checkout_session_id TEXT,
        amount_cents INTEGER NOT NULL DEFAULT 0,
        purchased_at TEXT NOT NULL,
        UNIQUE(user_id, course_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS progress (
        id BLOB PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        content_id BLOB NOT NULL REFERENCES course_content(id) ON DELETE CASCADE,
        completed BOOLEAN NOT NULL DEFAULT 0,
        last_position_seconds INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL,
        UNIQUE(user_id, content_id)
    )
    "#,
];
