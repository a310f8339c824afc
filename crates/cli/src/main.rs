//! # CLI - colbin interactive shell
//!
//! A REPL-style command-line interface for poking at a single in-memory
//! `colbin-document` and a standalone string dictionary. Reads commands from
//! stdin, executes them against the document, and prints results to stdout.
//!
//! ## Commands
//!
//! ```text
//! NEW <nokey|autokey|ukey|ikey|skey>   Replace the current document
//! PUSH NULL                           Append a null to the top-level array
//! PUSH BOOL <true|false>              Append a bool
//! PUSH U32 <n> | PUSH I32 <n>         Append a fixed-width int
//! PUSH STR <s>                        Append a string
//! COL NEW <type> <capacity>           Append a column (u8/u16/u32/u64/i8/i16/i32/i64/f32/bool)
//! COL APPEND <value>                  Append a value to the first column found
//! COL GET <idx>                       Read an element of the first column
//! COL REMOVE <idx>                    Remove an element, shifting the tail
//! COL PROMOTE                         Rewrite the first column as a plain array
//! PACK                                revise_begin -> pack -> revise_end
//! REVISE SET_AUTO <id>                revise_begin -> set_auto -> revise_end
//! REVISE SET_UNSIGNED <n>             revise_begin -> set_unsigned -> revise_end
//! REVISE SET_SIGNED <n>               revise_begin -> set_signed -> revise_end
//! REVISE SET_STRING <s>               revise_begin -> set_string -> revise_end
//! DUMP                                Print every top-level array element
//! DICT INSERT <word...>               Insert words, printing their ids
//! DICT EXTRACT <id>                   Reverse-lookup an id
//! DICT REMOVE <id>                    Drop an id from the dictionary
//! STATS                               Print revision/key/size info
//! EXIT / QUIT                         Shut down
//! ```
use anyhow::{anyhow, Result};
use colbin_dict::StringDictionary;
use colbin_document::{Document, KeyKind};
use colbin_field::ColumnType;
use std::io::{self, BufRead, Write};

fn parse_key_kind(s: &str) -> Result<KeyKind> {
    Ok(match s.to_lowercase().as_str() {
        "nokey" => KeyKind::NoKey,
        "autokey" => KeyKind::AutoKey,
        "ukey" => KeyKind::UKey,
        "ikey" => KeyKind::IKey,
        "skey" => KeyKind::SKey,
        other => return Err(anyhow!("unknown key kind: {other}")),
    })
}

fn parse_column_type(s: &str) -> Result<ColumnType> {
    Ok(match s.to_lowercase().as_str() {
        "u8" => ColumnType::U8,
        "u16" => ColumnType::U16,
        "u32" => ColumnType::U32,
        "u64" => ColumnType::U64,
        "i8" => ColumnType::I8,
        "i16" => ColumnType::I16,
        "i32" => ColumnType::I32,
        "i64" => ColumnType::I64,
        "f32" => ColumnType::Float,
        "bool" => ColumnType::Boolean,
        other => return Err(anyhow!("unknown column type: {other}")),
    })
}

fn dump(doc: &mut Document) -> Result<()> {
    use colbin_document::Element;
    let mut it = doc.iterator_open()?;
    it.rewind()?;
    let mut n = 0;
    loop {
        match it.current()? {
            Element::Null => println!("[{n}] null"),
            Element::Bool(b) => println!("[{n}] bool {b}"),
            Element::U8(v) => println!("[{n}] u8 {v}"),
            Element::I8(v) => println!("[{n}] i8 {v}"),
            Element::U16(v) => println!("[{n}] u16 {v}"),
            Element::I16(v) => println!("[{n}] i16 {v}"),
            Element::U32(v) => println!("[{n}] u32 {v}"),
            Element::I32(v) => println!("[{n}] i32 {v}"),
            Element::U64(v) => println!("[{n}] u64 {v}"),
            Element::I64(v) => println!("[{n}] i64 {v}"),
            Element::Float(v) => println!("[{n}] f32 {v}"),
            Element::Str(s) => println!("[{n}] str {s:?}"),
            Element::Binary { mime, bytes } => println!("[{n}] binary mime={mime} len={}", bytes.len()),
            Element::BinaryCustom { type_name, bytes } => {
                println!("[{n}] binary-custom type={type_name:?} len={}", bytes.len())
            }
            Element::Array(_) => println!("[{n}] array"),
            Element::Object(_) => println!("[{n}] object"),
            Element::Column(col) => println!("[{n}] column type={:?} count={} capacity={}", col.column_type(), col.count(), col.capacity()),
        }
        n += 1;
        if !it.next()? {
            break;
        }
    }
    if n == 0 {
        println!("(empty)");
    }
    Ok(())
}

/// `COL APPEND/REMOVE/PROMOTE` all act on the top-level array's first
/// element, which must itself be a column.
fn require_leading_column(doc: &mut Document) -> Result<()> {
    use colbin_field::FieldType;
    let mut it = doc.iterator_open()?;
    it.rewind()?;
    if !it.field_type()?.is_column() {
        return Err(anyhow!("no column at the front of the array; use COL NEW first"));
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut doc = Document::new(KeyKind::NoKey)?;
    let dict = StringDictionary::new();

    println!("colbin started (kind={:?}, revision={})", doc.key_kind(), doc.revision());
    println!("type a command, or EXIT to quit");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            let rest: Vec<&str> = parts.collect();
            match cmd.to_uppercase().as_str() {
                "NEW" => match rest.first().ok_or_else(|| anyhow!("usage: NEW <kind>")).and_then(|k| parse_key_kind(k)) {
                    Ok(kind) => match Document::new(kind) {
                        Ok(d) => {
                            doc = d;
                            println!("OK");
                        }
                        Err(e) => println!("ERR {e}"),
                    },
                    Err(e) => println!("ERR {e}"),
                },
                "PUSH" => {
                    let result = (|| -> Result<()> {
                        let mut it = doc.iterator_open()?;
                        it.rewind()?;
                        while it.next()? {}
                        match rest.first().map(|s| s.to_uppercase()).as_deref() {
                            Some("NULL") => it.insert_null()?,
                            Some("BOOL") => {
                                let v: bool = rest.get(1).ok_or_else(|| anyhow!("usage: PUSH BOOL <true|false>"))?.parse()?;
                                it.insert_bool(v)?;
                            }
                            Some("U32") => {
                                let v: u32 = rest.get(1).ok_or_else(|| anyhow!("usage: PUSH U32 <n>"))?.parse()?;
                                it.insert_u32(v)?;
                            }
                            Some("I32") => {
                                let v: i32 = rest.get(1).ok_or_else(|| anyhow!("usage: PUSH I32 <n>"))?.parse()?;
                                it.insert_i32(v)?;
                            }
                            Some("STR") => {
                                let s = rest.get(1..).map(|s| s.join(" ")).unwrap_or_default();
                                it.insert_string(&s)?;
                            }
                            _ => return Err(anyhow!("usage: PUSH NULL|BOOL|U32|I32|STR ...")),
                        }
                        Ok(())
                    })();
                    match result {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR {e}"),
                    }
                }
                "COL" => {
                    let sub = rest.first().map(|s| s.to_uppercase());
                    let result = (|| -> Result<()> {
                        match sub.as_deref() {
                            Some("NEW") => {
                                let ct = parse_column_type(rest.get(1).ok_or_else(|| anyhow!("usage: COL NEW <type> <capacity>"))?)?;
                                let cap: u64 = rest.get(2).ok_or_else(|| anyhow!("usage: COL NEW <type> <capacity>"))?.parse()?;
                                let mut it = doc.iterator_open()?;
                                it.rewind()?;
                                while it.next()? {}
                                it.insert_column(ct, cap)?;
                            }
                            Some("APPEND") => {
                                let v: i64 = rest.get(1).ok_or_else(|| anyhow!("usage: COL APPEND <value>"))?.parse()?;
                                require_leading_column(&mut doc)?;
                                let mut it = doc.iterator_open()?;
                                it.rewind()?;
                                let mut col = it.open_nested_column()?;
                                match col.column_type() {
                                    ColumnType::U8 => col.append_u8(v as u8)?,
                                    ColumnType::U16 => col.append_u16(v as u16)?,
                                    ColumnType::U32 => col.append_u32(v as u32)?,
                                    ColumnType::U64 => col.append_u64(v as u64)?,
                                    ColumnType::I8 => col.append_i8(v as i8)?,
                                    ColumnType::I16 => col.append_i16(v as i16)?,
                                    ColumnType::I32 => col.append_i32(v as i32)?,
                                    ColumnType::I64 => col.append_i64(v)?,
                                    ColumnType::Float => col.append_float(v as f32)?,
                                    ColumnType::Boolean => col.append_bool(v != 0)?,
                                }
                            }
                            Some("REMOVE") => {
                                let idx: u64 = rest.get(1).ok_or_else(|| anyhow!("usage: COL REMOVE <idx>"))?.parse()?;
                                require_leading_column(&mut doc)?;
                                let mut it = doc.iterator_open()?;
                                it.rewind()?;
                                let mut col = it.open_nested_column()?;
                                col.remove(idx)?;
                            }
                            Some("PROMOTE") => {
                                require_leading_column(&mut doc)?;
                                let mut it = doc.iterator_open()?;
                                it.rewind()?;
                                let col = it.open_nested_column()?;
                                col.promote_to_array()?;
                            }
                            _ => return Err(anyhow!("usage: COL NEW|APPEND|REMOVE|PROMOTE ...")),
                        }
                        Ok(())
                    })();
                    match result {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR {e}"),
                    }
                }
                "PACK" => {
                    let result = (|| -> Result<()> {
                        let mut ctx = colbin_document::revise_begin(&mut doc)?;
                        ctx.pack()?;
                        ctx.end()?;
                        Ok(())
                    })();
                    match result {
                        Ok(()) => println!("OK (revision={})", doc.revision()),
                        Err(e) => println!("ERR {e}"),
                    }
                }
                "REVISE" => {
                    let sub = rest.first().map(|s| s.to_uppercase());
                    let result = (|| -> Result<()> {
                        let mut ctx = colbin_document::revise_begin(&mut doc)?;
                        match sub.as_deref() {
                            Some("SET_AUTO") => {
                                let v: u64 = rest.get(1).ok_or_else(|| anyhow!("usage: REVISE SET_AUTO <id>"))?.parse()?;
                                ctx.set_auto(v)?;
                            }
                            Some("SET_UNSIGNED") => {
                                let v: u64 = rest.get(1).ok_or_else(|| anyhow!("usage: REVISE SET_UNSIGNED <n>"))?.parse()?;
                                ctx.set_unsigned(v)?;
                            }
                            Some("SET_SIGNED") => {
                                let v: i64 = rest.get(1).ok_or_else(|| anyhow!("usage: REVISE SET_SIGNED <n>"))?.parse()?;
                                ctx.set_signed(v)?;
                            }
                            Some("SET_STRING") => {
                                let s = rest.get(1..).map(|s| s.join(" ")).unwrap_or_default();
                                ctx.set_string(&s)?;
                            }
                            _ => {
                                ctx.abort();
                                return Err(anyhow!("usage: REVISE SET_AUTO|SET_UNSIGNED|SET_SIGNED|SET_STRING ..."));
                            }
                        }
                        ctx.end()?;
                        Ok(())
                    })();
                    match result {
                        Ok(()) => println!("OK (revision={})", doc.revision()),
                        Err(e) => println!("ERR {e}"),
                    }
                }
                "DUMP" => {
                    if let Err(e) = dump(&mut doc) {
                        println!("ERR {e}");
                    }
                }
                "DICT" => {
                    let sub = rest.first().map(|s| s.to_uppercase());
                    match sub.as_deref() {
                        Some("INSERT") => {
                            let words: Vec<&str> = rest[1..].to_vec();
                            if words.is_empty() {
                                println!("ERR usage: DICT INSERT <word...>");
                            } else {
                                let ids = dict.insert(&words);
                                for (w, id) in words.iter().zip(ids.iter()) {
                                    println!("{w} -> {id}");
                                }
                            }
                        }
                        Some("EXTRACT") => {
                            let id: u64 = rest.get(1).and_then(|s| s.parse().ok()).unwrap_or(u64::MAX);
                            let ids = [colbin_dict::StringId(id)];
                            match dict.extract(&ids).into_iter().next().flatten() {
                                Some(s) => println!("{s}"),
                                None => println!("(nil)"),
                            }
                        }
                        Some("REMOVE") => {
                            let id: u64 = rest.get(1).and_then(|s| s.parse().ok()).unwrap_or(u64::MAX);
                            dict.remove(&[colbin_dict::StringId(id)]);
                            println!("OK");
                        }
                        _ => println!("ERR usage: DICT INSERT|EXTRACT|REMOVE ..."),
                    }
                }
                "STATS" => {
                    println!(
                        "kind={:?} revision={} latest={} bytes={}",
                        doc.key_kind(),
                        doc.revision(),
                        doc.is_latest(),
                        doc.as_bytes().len()
                    );
                    println!("dict distinct={}", dict.num_distinct());
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {other}");
                }
            }
        }
        print!("> ");
        io::stdout().flush().ok();
    }
    Ok(())
}
