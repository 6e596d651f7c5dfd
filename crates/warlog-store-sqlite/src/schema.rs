//! SQL schema for the warlog SQLite store.
//!
//! Executed on every writer startup. Every statement is `IF NOT EXISTS`, so
//! existing tables are never dropped or altered. `PRAGMA user_version`
//! records the layout for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
///
/// All instants are Unix seconds.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Reference tables. The first row written for a key is permanent;
-- rows are inserted with ON CONFLICT DO NOTHING and never updated.
CREATE TABLE IF NOT EXISTS planets_info (
    planet_index  INTEGER PRIMARY KEY,
    sector        INTEGER NOT NULL,
    max_health    INTEGER NOT NULL,
    initial_owner INTEGER NOT NULL,
    position_x    REAL    NOT NULL,
    position_y    REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS planet_regions_info (
    planet_index INTEGER NOT NULL,
    region_index INTEGER NOT NULL,
    max_health   INTEGER NOT NULL,
    region_size  INTEGER NOT NULL,
    PRIMARY KEY (planet_index, region_index)
);

CREATE TABLE IF NOT EXISTS major_orders (
    order_id     INTEGER PRIMARY KEY,
    title        TEXT    NOT NULL,
    brief        TEXT    NOT NULL,
    task_type    INTEGER NOT NULL,
    target_value INTEGER NOT NULL,
    created_at   INTEGER NOT NULL,
    expires_at   INTEGER NOT NULL
);

-- History tables are strictly append-only.
-- No UPDATE or DELETE is ever issued against them.
CREATE TABLE IF NOT EXISTS war_status_history (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp           INTEGER NOT NULL,
    war_id              INTEGER NOT NULL,
    war_time            INTEGER NOT NULL,
    impact_multiplier   REAL    NOT NULL,
    total_planets       INTEGER NOT NULL,
    super_earth_planets INTEGER NOT NULL,
    enemy_planets       INTEGER NOT NULL,
    total_players       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS planet_status_history (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp        INTEGER NOT NULL,
    planet_index     INTEGER NOT NULL,
    owner            INTEGER NOT NULL,
    health           INTEGER NOT NULL,
    players          INTEGER NOT NULL,
    regen_per_second REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS planet_regions_history (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp        INTEGER NOT NULL,
    planet_index     INTEGER NOT NULL,
    region_index     INTEGER NOT NULL,
    owner            INTEGER NOT NULL,
    health           INTEGER NOT NULL,
    regen_per_second REAL    NOT NULL,
    is_available     INTEGER NOT NULL,   -- 0 | 1
    players          INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS war_stats_history (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp            INTEGER NOT NULL,
    missions_won         INTEGER NOT NULL,
    missions_lost        INTEGER NOT NULL,
    mission_success_rate REAL    NOT NULL,
    bug_kills            INTEGER NOT NULL,
    automaton_kills      INTEGER NOT NULL,
    illuminate_kills     INTEGER NOT NULL,
    total_deaths         INTEGER NOT NULL,
    accuracy             REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS global_resources_history (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp     INTEGER NOT NULL,
    resource_id   INTEGER NOT NULL,
    current_value INTEGER NOT NULL,
    max_value     INTEGER NOT NULL,
    percentage    REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS major_orders_progress (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp           INTEGER NOT NULL,
    order_id            INTEGER NOT NULL,
    current_progress    INTEGER NOT NULL,
    progress_percentage REAL    NOT NULL,
    expires_in          INTEGER NOT NULL
);

-- News is the one mutable table: a row is rewritten only when its
-- message changes, and stored_at is never touched after insert.
CREATE TABLE IF NOT EXISTS news (
    news_id    INTEGER PRIMARY KEY,
    published  INTEGER NOT NULL,
    type       INTEGER NOT NULL,
    tag_ids    TEXT    NOT NULL DEFAULT '[]',   -- JSON array
    message    TEXT    NOT NULL DEFAULT '',
    stored_at  INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_war_status_timestamp       ON war_status_history(timestamp);
CREATE INDEX IF NOT EXISTS idx_war_stats_timestamp        ON war_stats_history(timestamp);
CREATE INDEX IF NOT EXISTS idx_global_resources_timestamp ON global_resources_history(timestamp);
CREATE INDEX IF NOT EXISTS idx_planet_status_timestamp    ON planet_status_history(timestamp);
CREATE INDEX IF NOT EXISTS idx_planet_regions_timestamp   ON planet_regions_history(timestamp);
CREATE INDEX IF NOT EXISTS idx_orders_progress_timestamp  ON major_orders_progress(timestamp);
CREATE INDEX IF NOT EXISTS idx_planet_status_planet       ON planet_status_history(planet_index, timestamp);
CREATE INDEX IF NOT EXISTS idx_planet_regions_region      ON planet_regions_history(planet_index, region_index, timestamp);
CREATE INDEX IF NOT EXISTS idx_orders_progress_order      ON major_orders_progress(order_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_news_published             ON news(published);
CREATE INDEX IF NOT EXISTS idx_news_type                  ON news(type);

PRAGMA user_version = 1;
";
