#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, Worksheet};

/// One cell of a fixture worksheet.
#[derive(Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Num(f64),
    Blank,
}

pub use Cell::{Blank, Num, Text};

pub struct SheetFixture<'a> {
    pub name: &'a str,
    pub rows: Vec<Vec<Cell<'a>>>,
}

/// Serialize the sheets into an in-memory xlsx workbook.
pub fn workbook(sheets: &[SheetFixture]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(sheet.name).unwrap();
        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match *cell {
                    Text(s) => {
                        worksheet.write_string(r as u32, c as u16, s).unwrap();
                    }
                    Num(n) => {
                        worksheet.write_number(r as u32, c as u16, n).unwrap();
                    }
                    Blank => {}
                }
            }
        }
        workbook.push_worksheet(worksheet);
    }
    workbook.save_to_buffer().unwrap()
}

/// Player sheet: A (1000 min, 5 goals, 2 assists), B (500, 0, 1), C (1500, 3, 0).
pub fn players_sheet(name: &str) -> SheetFixture<'_> {
    SheetFixture {
        name,
        rows: vec![
            vec![
                Text("Jugador"),
                Text("Minutos jugados"),
                Text("Goles"),
                Text("Asistencias"),
            ],
            vec![Text("A"), Num(1000.0), Num(5.0), Num(2.0)],
            vec![Text("B"), Num(500.0), Num(0.0), Num(1.0)],
            vec![Text("C"), Num(1500.0), Num(3.0), Num(0.0)],
        ],
    }
}

/// Team sheet without a minutes column.
pub fn teams_sheet(name: &str) -> SheetFixture<'_> {
    SheetFixture {
        name,
        rows: vec![
            vec![Text("Equipo"), Text("Goles"), Text("xG")],
            vec![Text("Arsenal"), Num(70.0), Num(65.5)],
            vec![Text("Chelsea"), Num(60.0), Num(58.25)],
            vec![Text("Everton"), Num(40.0), Num(45.0)],
        ],
    }
}

/// Sheet with neither identifier column.
pub fn anonymous_sheet(name: &str) -> SheetFixture<'_> {
    SheetFixture {
        name,
        rows: vec![
            vec![Text("Nombre"), Text("Goles")],
            vec![Text("A"), Num(1.0)],
        ],
    }
}

/// Workbook with "Jugadores" then "Equipos".
pub fn league_workbook() -> Vec<u8> {
    workbook(&[players_sheet("Jugadores"), teams_sheet("Equipos")])
}
