// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::db::{IndexStore, IndexStoreExt};

pub fn write_read_bin<DB>(db: &DB)
where
    DB: IndexStore,
{
    let key = "dat://0/";
    let value = [1];
    db.write_bin(key, &value).unwrap();
    let res = db.read_bin(key).unwrap().unwrap();
    assert_eq!(value.as_ref(), res.as_slice());
}

pub fn write_read_obj<DB>(db: &DB)
where
    DB: IndexStore,
{
    let key = "Cthulhu";
    let value = 42;
    db.write_obj(key, &value).unwrap();
    let res: i32 = db.read_obj(key).unwrap().unwrap();
    assert_eq!(value, res);

    // records are upserted, the last write wins
    let value = 1337;
    db.write_obj(key, &value).unwrap();
    let res: i32 = db.read_obj(key).unwrap().unwrap();
    assert_eq!(value, res);
}

pub fn exists<DB>(db: &DB)
where
    DB: IndexStore,
{
    let key = "0";
    let value = [1];
    db.write_bin(key, &value).unwrap();
    let res = db.exists(key).unwrap();
    assert!(res);
}

pub fn does_not_exist<DB>(db: &DB)
where
    DB: IndexStore,
{
    let key = "Azathoth";

    assert!(!db.exists(key).unwrap());
    assert!(db.read_obj::<i32>(key).unwrap().is_none());
}

pub fn delete<DB>(db: &DB)
where
    DB: IndexStore,
{
    let key = "Dagon";
    db.write_obj(key, &1).unwrap();
    db.delete(key).unwrap();
    assert!(!db.exists(key).unwrap());
    // absent keys are not an error
    db.delete(key).unwrap();
    db.delete("Hastur").unwrap();
}

pub fn entries<DB>(db: &DB)
where
    DB: IndexStore,
{
    assert!(db.entries().unwrap().is_empty());
    db.write_obj("a", &1).unwrap();
    db.write_obj("b", &2).unwrap();
    db.write_obj("a", &3).unwrap();
    let mut entries = db.entries().unwrap();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("a".to_string(), b"3".to_vec()),
            ("b".to_string(), b"2".to_vec()),
        ]
    );
}
