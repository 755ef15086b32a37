use rusqlite::{
    params,
    Connection,
};
use serde_json::json;
use sha1::{
    Digest,
    Sha1,
};

use crate::{
    core::DeckError,
    sink::{
        Deck,
        Model,
    },
};

/// Legacy Anki collection schema (version 11). Anki still imports this
/// format and upgrades it on the fly, which keeps the sink independent of
/// the current client's internal schema churn.
const SCHEMA: &str = "
CREATE TABLE col (
    id integer primary key,
    crt integer not null,
    mod integer not null,
    scm integer not null,
    ver integer not null,
    dty integer not null,
    usn integer not null,
    ls integer not null,
    conf text not null,
    models text not null,
    decks text not null,
    dconf text not null,
    tags text not null
);
CREATE TABLE notes (
    id integer primary key,
    guid text not null,
    mid integer not null,
    mod integer not null,
    usn integer not null,
    tags text not null,
    flds text not null,
    sfld integer not null,
    csum integer not null,
    flags integer not null,
    data text not null
);
CREATE TABLE cards (
    id integer primary key,
    nid integer not null,
    did integer not null,
    ord integer not null,
    mod integer not null,
    usn integer not null,
    type integer not null,
    queue integer not null,
    due integer not null,
    ivl integer not null,
    factor integer not null,
    reps integer not null,
    lapses integer not null,
    left integer not null,
    odue integer not null,
    odid integer not null,
    flags integer not null,
    data text not null
);
CREATE TABLE revlog (
    id integer primary key,
    cid integer not null,
    usn integer not null,
    ease integer not null,
    ivl integer not null,
    lastIvl integer not null,
    factor integer not null,
    time integer not null,
    type integer not null
);
CREATE TABLE graves (
    usn integer not null,
    oid integer not null,
    type integer not null
);
CREATE INDEX ix_notes_usn ON notes (usn);
CREATE INDEX ix_cards_usn ON cards (usn);
CREATE INDEX ix_revlog_usn ON revlog (usn);
CREATE INDEX ix_cards_nid ON cards (nid);
CREATE INDEX ix_cards_sched ON cards (did, queue, due);
CREATE INDEX ix_revlog_cid ON revlog (cid);
CREATE INDEX ix_notes_csum ON notes (csum);
";

/// Fields within a note record are separated by 0x1f, as Anki expects.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Writes one deck into a fresh collection database. `now_millis` stamps the
/// collection and seeds note/card row ids.
pub(crate) fn write_collection(
    conn: &Connection,
    deck: &Deck,
    now_millis: i64,
) -> Result<(), DeckError> {
    conn.execute_batch(SCHEMA)?;

    let now_secs = now_millis / 1000;
    let model_json = model_to_json(&deck.model, deck.id, now_secs);

    let conf = json!({
        "activeDecks": [1],
        "addToCur": true,
        "collapseTime": 1200,
        "curDeck": 1,
        "curModel": deck.model.id.to_string(),
        "dueCounts": true,
        "estTimes": true,
        "newBury": true,
        "newSpread": 0,
        "nextPos": 1,
        "sortBackwards": false,
        "sortType": "noteFld",
        "timeLim": 0
    });

    let decks = json!({
        "1": deck_json(1, "Default", "", 0, now_secs),
        (deck.id.to_string()): deck_json(deck.id, &deck.name, &deck.description, -1, now_secs),
    });

    let dconf = json!({
        "1": {
            "autoplay": true,
            "id": 1,
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0
            },
            "maxTaken": 60,
            "mod": 0,
            "name": "Default",
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true
            },
            "replayq": true,
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "minSpace": 1,
                "perDay": 100
            },
            "timer": 0,
            "usn": 0
        }
    });

    let models = json!({ (deck.model.id.to_string()): model_json });

    conn.execute(
        "INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
         VALUES (1, ?1, ?2, ?3, 11, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
        params![
            now_secs,
            now_millis,
            now_millis,
            conf.to_string(),
            models.to_string(),
            decks.to_string(),
            dconf.to_string()
        ],
    )?;

    let mut note_stmt = conn.prepare(
        "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
         VALUES (?1, ?2, ?3, ?4, -1, '', ?5, ?6, ?7, 0, '')",
    )?;
    let mut card_stmt = conn.prepare(
        "INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due, ivl, factor,
                            reps, lapses, left, odue, odid, flags, data)
         VALUES (?1, ?2, ?3, ?4, ?5, -1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, '')",
    )?;

    // Row ids only have to be unique within the collection; identity across
    // runs is carried by the guid alone.
    let mut next_id = now_millis;
    for note in &deck.notes {
        let note_id = next_id;
        next_id += 1;

        let flds: String = note
            .fields
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(&FIELD_SEPARATOR.to_string());
        let sort_field = note.fields.first().map(|f| f.as_str()).unwrap_or("");

        note_stmt.execute(params![
            note_id,
            note.guid,
            deck.model.id,
            now_secs,
            flds,
            sort_field,
            field_checksum(sort_field)
        ])?;

        for ord in 0..deck.model.templates.len() {
            let card_id = next_id;
            next_id += 1;
            card_stmt.execute(params![card_id, note_id, deck.id, ord as i64, now_secs])?;
        }
    }

    Ok(())
}

fn deck_json(
    id: i64,
    name: &str,
    description: &str,
    usn: i64,
    now_secs: i64,
) -> serde_json::Value {
    json!({
        "collapsed": false,
        "conf": 1,
        "desc": description,
        "dyn": 0,
        "extendNew": 0,
        "extendRev": 50,
        "id": id,
        "lrnToday": [0, 0],
        "mod": now_secs,
        "name": name,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "timeToday": [0, 0],
        "usn": usn
    })
}

fn model_to_json(model: &Model, deck_id: i64, now_secs: i64) -> serde_json::Value {
    let flds: Vec<serde_json::Value> = model
        .fields
        .iter()
        .enumerate()
        .map(|(ord, name)| {
            json!({
                "font": "Liberation Sans",
                "media": [],
                "name": name,
                "ord": ord,
                "rtl": false,
                "size": 20,
                "sticky": false
            })
        })
        .collect();

    let tmpls: Vec<serde_json::Value> = model
        .templates
        .iter()
        .enumerate()
        .map(|(ord, tmpl)| {
            json!({
                "afmt": tmpl.afmt,
                "bafmt": "",
                "bqfmt": "",
                "did": null,
                "name": tmpl.name,
                "ord": ord,
                "qfmt": tmpl.qfmt
            })
        })
        .collect();

    let req: Vec<serde_json::Value> = model
        .templates
        .iter()
        .enumerate()
        .map(|(ord, tmpl)| {
            let referenced: Vec<usize> = model
                .fields
                .iter()
                .enumerate()
                .filter(|(_, name)| tmpl.qfmt.contains(&format!("{{{{{name}}}}}")))
                .map(|(i, _)| i)
                .collect();
            let indices = if referenced.is_empty() { vec![0] } else { referenced };
            json!([ord, "any", indices])
        })
        .collect();

    json!({
        "css": model.css,
        "did": deck_id,
        "flds": flds,
        "id": model.id.to_string(),
        "latexPost": "\\end{document}",
        "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
        "mod": now_secs,
        "name": model.name,
        "req": req,
        "sortf": 0,
        "tags": [],
        "tmpls": tmpls,
        "type": 0,
        "usn": -1,
        "vers": []
    })
}

/// Anki's note checksum: first 8 hex digits of the SHA-1 of the sort field.
fn field_checksum(field: &str) -> i64 {
    let digest = Sha1::digest(field.as_bytes());
    let hex = format!("{digest:x}");
    i64::from_str_radix(&hex[..8], 16).unwrap_or(0)
}
