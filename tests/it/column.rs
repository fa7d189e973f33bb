// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::io::{BufReader, Cursor, Seek, SeekFrom};

use rand::{rngs::StdRng, Rng, SeedableRng};

use pagecodec::read::page::decode_data_page;
use pagecodec::read::{ColumnReader, Page};
use pagecodec::types::ValueType;
use pagecodec::write::{ColumnWriter, WriteOptions};
use pagecodec::{ColumnDescriptor, ColumnMeta, ColumnValues, Encoding};

const WRITE_PAGE: usize = 128;

fn new_nullable_column<T: ValueType>(
    rng: &mut StdRng,
    length: usize,
    value: impl Fn(&mut StdRng) -> T,
) -> ColumnValues<T> {
    let mut column = ColumnValues::default();
    for _ in 0..length {
        if rng.gen_bool(0.2) {
            column.def_levels.push(0);
        } else {
            column.def_levels.push(1);
            column.values.push(value(&mut *rng));
        }
    }
    column
}

fn write_and_read<T: ValueType>(
    column: &ColumnValues<T>,
    descriptor: &ColumnDescriptor,
    options: WriteOptions,
) -> ColumnValues<T> {
    let mut writer = ColumnWriter::new(vec![], options);
    let meta = writer.write_column(column, descriptor).unwrap();
    let data = writer.into_inner();
    assert_eq!(meta.total_len() as usize, data.len());

    let mut reader = ColumnReader::try_new(Cursor::new(data), &meta).unwrap();
    reader.read_column::<T>(descriptor).unwrap()
}

fn test_options() -> Vec<WriteOptions> {
    let mut options = vec![];
    for encoding in [Encoding::Plain, Encoding::DeltaBinaryPacked] {
        options.push(WriteOptions {
            default_encoding: encoding,
            max_page_size: Some(WRITE_PAGE),
            ..Default::default()
        });
    }
    options.push(WriteOptions {
        default_encode_ratio: Some(1.0),
        max_page_size: Some(WRITE_PAGE),
        ..Default::default()
    });
    options
}

#[test]
fn test_nullable_columns() {
    let mut rng = StdRng::seed_from_u64(11);
    let descriptor = ColumnDescriptor::new(1, 0);
    for options in test_options() {
        let column = new_nullable_column(&mut rng, 1000, |rng| rng.gen::<i8>());
        assert_eq!(write_and_read(&column, &descriptor, options.clone()), column);

        let column = new_nullable_column(&mut rng, 777, |rng| rng.gen::<u16>());
        assert_eq!(write_and_read(&column, &descriptor, options.clone()), column);

        let column = new_nullable_column(&mut rng, 1500, |rng| rng.gen::<u32>());
        assert_eq!(write_and_read(&column, &descriptor, options.clone()), column);

        let column = new_nullable_column(&mut rng, 1500, |rng| rng.gen_range(0..10u64));
        assert_eq!(write_and_read(&column, &descriptor, options.clone()), column);

        let column = new_nullable_column(&mut rng, 300, |rng| rng.gen::<i64>());
        assert_eq!(write_and_read(&column, &descriptor, options), column);
    }
}

#[test]
fn test_required_columns() {
    let descriptor = ColumnDescriptor::required();
    for options in test_options() {
        let column = ColumnValues::required((0..5000i32).map(|x| x / 7).collect());
        assert_eq!(write_and_read(&column, &descriptor, options.clone()), column);

        let column = ColumnValues::required(vec![i64::MIN, i64::MAX, 0, -1, 1]);
        assert_eq!(write_and_read(&column, &descriptor, options), column);
    }
}

#[test]
fn test_repeated_column() {
    let mut rng = StdRng::seed_from_u64(12);
    let descriptor = ColumnDescriptor::new(2, 1);
    let mut column = ColumnValues::default();
    for _ in 0..400 {
        // an empty list, or a list of nullable items
        let items = rng.gen_range(0..5);
        if items == 0 {
            column.rep_levels.push(0);
            column.def_levels.push(0);
            continue;
        }
        for i in 0..items {
            column.rep_levels.push(if i == 0 { 0 } else { 1 });
            if rng.gen_bool(0.1) {
                column.def_levels.push(1);
            } else {
                column.def_levels.push(2);
                column.values.push(rng.gen::<i32>());
            }
        }
    }
    for options in test_options() {
        assert_eq!(write_and_read(&column, &descriptor, options), column);
    }
}

fn write_pages(length: i64) -> (Vec<u8>, ColumnMeta) {
    let options = WriteOptions {
        max_page_size: Some(WRITE_PAGE),
        default_encoding: Encoding::DeltaBinaryPacked,
        ..Default::default()
    };
    let mut writer = ColumnWriter::new(vec![], options);
    let column = ColumnValues::required((0..length).collect());
    let meta = writer
        .write_column(&column, &ColumnDescriptor::required())
        .unwrap();
    (writer.into_inner(), meta)
}

fn first_value(page: Page) -> i64 {
    match page {
        Page::Data(page) => {
            decode_data_page::<i64>(&page, &ColumnDescriptor::required(), None)
                .unwrap()
                .values[0]
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_skip_pages() {
    let (data, meta) = write_pages(1000);
    assert_eq!(meta.pages.len(), 8);

    let mut reader = ColumnReader::try_new(Cursor::new(data), &meta).unwrap();
    reader.skip_page().unwrap();
    reader.skip_page().unwrap();
    assert_eq!(reader.current_page(), 2);
    assert_eq!(first_value(reader.next_page().unwrap().unwrap()), 256);

    // nth seeks over the pages it skips
    let page = reader.nth(2).unwrap().unwrap();
    assert_eq!(first_value(page), 5 * WRITE_PAGE as i64);
    assert_eq!(reader.size_hint(), (2, Some(2)));
    assert!(reader.nth(2).is_none());
}

#[test]
fn test_skip_past_end() {
    let (data, meta) = write_pages(1000);
    let mut reader = ColumnReader::try_new(Cursor::new(data), &meta).unwrap();
    assert_eq!(reader.skip_pages(5).unwrap(), 5);
    assert_eq!(
        first_value(reader.next_page().unwrap().unwrap()),
        5 * WRITE_PAGE as i64
    );
    assert_eq!(reader.skip_pages(10).unwrap(), 2);
    assert!(!reader.has_next());
    reader.skip_page().unwrap();
    assert_eq!(reader.current_page(), 8);
}

#[test]
fn test_sliced_meta() {
    let (data, meta) = write_pages(1000);
    let sliced = meta.slice(3..5).unwrap();
    let reader = ColumnReader::try_new(Cursor::new(data), &sliced).unwrap();
    let firsts = reader.map(|page| first_value(page.unwrap())).collect::<Vec<_>>();
    assert_eq!(firsts, vec![384, 512]);
}

#[test]
fn test_wrong_meta_length() {
    let (data, mut meta) = write_pages(300);
    meta.pages[0].length += 1;
    let mut reader = ColumnReader::try_new(Cursor::new(data), &meta).unwrap();
    assert!(reader.next_page().is_err());
}

#[test]
fn test_file_backed_chunks() {
    let mut file = tempfile::tempfile().unwrap();
    let options = WriteOptions {
        default_encode_ratio: Some(1.2),
        max_page_size: Some(WRITE_PAGE),
        ..Default::default()
    };
    let mut writer = ColumnWriter::new(&mut file, options);
    let sorted = ColumnValues::required((0..2000u64).map(|x| x * 1000).collect());
    let low_cardinality = ColumnValues::required((0..2000i16).map(|x| x % 5 * 1000).collect());
    let sorted_meta = writer
        .write_column(&sorted, &ColumnDescriptor::required())
        .unwrap();
    let low_cardinality_meta = writer
        .write_column(&low_cardinality, &ColumnDescriptor::required())
        .unwrap();
    writer.flush().unwrap();
    drop(writer);

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reader =
        ColumnReader::try_new(BufReader::new(file), &low_cardinality_meta).unwrap();
    match reader.next_page().unwrap().unwrap() {
        Page::Dictionary(page) => assert_eq!(page.num_values, 5),
        other => panic!("unexpected {other:?}"),
    }
    let mut file = reader.into_inner().into_inner();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reader =
        ColumnReader::try_new(BufReader::new(&mut file), &low_cardinality_meta).unwrap();
    let read = reader
        .read_column::<i16>(&ColumnDescriptor::required())
        .unwrap();
    assert_eq!(read, low_cardinality);

    let mut reader = ColumnReader::try_new(BufReader::new(&mut file), &sorted_meta).unwrap();
    match reader.next_page().unwrap().unwrap() {
        Page::Data(page) => assert_eq!(page.encoding, Encoding::DeltaBinaryPacked),
        other => panic!("unexpected {other:?}"),
    }
    let mut reader = ColumnReader::try_new(BufReader::new(&mut file), &sorted_meta).unwrap();
    let read = reader
        .read_column::<u64>(&ColumnDescriptor::required())
        .unwrap();
    assert_eq!(read, sorted);
}
