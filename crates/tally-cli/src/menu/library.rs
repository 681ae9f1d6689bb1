//! The lending library menu.

use std::io::{BufRead, Write};

use tally_library::{Book, BookField, Library, Loan, Member};
use tally_store::Listing;

use super::{failure, lending_message, report_durability, success, Flow};
use crate::prompt::{is_end_of_input, Prompter};

const MENU: &str = "
--- Sistema de Gestión de Biblioteca ---
1. Añadir libro
2. Mostrar libros
3. Prestar libro
4. Devolver libro
5. Quitar libro
6. Registrar usuario
7. Mostrar usuarios
8. Dar de baja usuario
9. Buscar libros por título
10. Buscar libros por autor
11. Buscar libros por categoría
12. Libros prestados a un usuario
13. Salir";

/// Run the menu until the user exits or input ends, then flush both stores.
pub fn run<R: BufRead, W: Write>(
    mut library: Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    loop {
        writeln!(prompt.out(), "{MENU}")?;
        match handle(&mut library, prompt) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) if is_end_of_input(&e) => break,
            Err(e) => failure(prompt.out(), &format!("Error inesperado: {e}"))?,
        }
    }

    writeln!(prompt.out(), "Guardando biblioteca...")?;
    if let Err(e) = library.close() {
        failure(prompt.out(), &lending_message(&e))?;
    }
    writeln!(prompt.out(), "¡Gracias por usar el Sistema de Gestión de Biblioteca!")?;
    Ok(())
}

fn handle<R: BufRead, W: Write>(
    library: &mut Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<Flow> {
    let choice = prompt.line("Seleccione una opción: ")?;
    match choice.as_str() {
        "1" => add_book(library, prompt)?,
        "2" => list_books(library, prompt)?,
        "3" => borrow(library, prompt)?,
        "4" => give_back(library, prompt)?,
        "5" => remove_book(library, prompt)?,
        "6" => register_member(library, prompt)?,
        "7" => list_members(library, prompt)?,
        "8" => remove_member(library, prompt)?,
        "9" => search(library, prompt, BookField::Title, "título")?,
        "10" => search(library, prompt, BookField::Author, "autor")?,
        "11" => search(library, prompt, BookField::Category, "categoría")?,
        "12" => held_by(library, prompt)?,
        "13" => return Ok(Flow::Exit),
        _ => writeln!(prompt.out(), "Opción no válida. Intente de nuevo.")?,
    }
    Ok(Flow::Continue)
}

fn add_book<R: BufRead, W: Write>(
    library: &mut Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let isbn = prompt.text("ISBN: ")?;
    if library.books().contains(&isbn) {
        failure(prompt.out(), "Ya existe un libro con ese ISBN.")?;
        return Ok(());
    }
    let title = prompt.text("Título: ")?;
    let author = prompt.text("Autor: ")?;
    let category = prompt.text("Categoría: ")?;

    match library.add_book(Book::new(isbn, title, author, category)) {
        Ok(durability) => {
            success(prompt.out(), "Libro añadido a la biblioteca.")?;
            report_durability(prompt.out(), &durability)?;
        }
        Err(e) => failure(prompt.out(), &lending_message(&e))?,
    }
    Ok(())
}

fn list_books<R: BufRead, W: Write>(
    library: &Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    match library.list_books() {
        Listing::Empty => writeln!(prompt.out(), "No hay libros en la biblioteca.")?,
        Listing::Records(books) => {
            writeln!(prompt.out(), "Libros en la biblioteca:")?;
            for book in books {
                writeln!(prompt.out(), "{book}")?;
            }
        }
    }
    Ok(())
}

fn borrow<R: BufRead, W: Write>(
    library: &mut Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let isbn = prompt.text("ISBN del libro a prestar: ")?;
    let member = prompt.text("ID del usuario: ")?;
    match library.borrow(&isbn, &member) {
        Ok(loan) => {
            success(prompt.out(), "Libro prestado exitosamente.")?;
            report_loan(prompt, &loan)?;
        }
        Err(e) => failure(prompt.out(), &lending_message(&e))?,
    }
    Ok(())
}

fn give_back<R: BufRead, W: Write>(
    library: &mut Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let isbn = prompt.text("ISBN del libro a devolver: ")?;
    let member = prompt.text("ID del usuario: ")?;
    match library.give_back(&isbn, &member) {
        Ok(loan) => {
            success(prompt.out(), "Libro devuelto exitosamente.")?;
            report_loan(prompt, &loan)?;
        }
        Err(e) => failure(prompt.out(), &lending_message(&e))?,
    }
    Ok(())
}

fn report_loan<R: BufRead, W: Write>(prompt: &mut Prompter<R, W>, loan: &Loan) -> anyhow::Result<()> {
    report_durability(prompt.out(), &loan.book)?;
    report_durability(prompt.out(), &loan.member)?;
    Ok(())
}

fn remove_book<R: BufRead, W: Write>(
    library: &mut Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let isbn = prompt.text("ISBN del libro a quitar: ")?;
    match library.remove_book(&isbn) {
        Ok((book, durability)) => {
            success(
                prompt.out(),
                &format!("Libro '{}' quitado de la biblioteca.", book.title),
            )?;
            report_durability(prompt.out(), &durability)?;
        }
        Err(e) => failure(prompt.out(), &lending_message(&e))?,
    }
    Ok(())
}

fn register_member<R: BufRead, W: Write>(
    library: &mut Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let id = prompt.text("ID de usuario: ")?;
    if library.members().contains(&id) {
        failure(prompt.out(), "Ya existe un usuario con ese ID.")?;
        return Ok(());
    }
    let name = prompt.text("Nombre del usuario: ")?;

    match library.register_member(Member::new(id, name)) {
        Ok(durability) => {
            success(prompt.out(), "Usuario registrado exitosamente.")?;
            report_durability(prompt.out(), &durability)?;
        }
        Err(e) => failure(prompt.out(), &lending_message(&e))?,
    }
    Ok(())
}

fn list_members<R: BufRead, W: Write>(
    library: &Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    match library.list_members() {
        Listing::Empty => writeln!(prompt.out(), "No hay usuarios registrados.")?,
        Listing::Records(members) => {
            writeln!(prompt.out(), "Usuarios registrados:")?;
            for member in members {
                writeln!(prompt.out(), "{member}")?;
            }
        }
    }
    Ok(())
}

fn remove_member<R: BufRead, W: Write>(
    library: &mut Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let id = prompt.text("ID del usuario a dar de baja: ")?;
    match library.remove_member(&id) {
        Ok((member, durability)) => {
            success(
                prompt.out(),
                &format!("Usuario '{}' dado de baja.", member.name),
            )?;
            report_durability(prompt.out(), &durability)?;
        }
        Err(e) => failure(prompt.out(), &lending_message(&e))?,
    }
    Ok(())
}

fn search<R: BufRead, W: Write>(
    library: &Library,
    prompt: &mut Prompter<R, W>,
    field: BookField,
    label: &str,
) -> anyhow::Result<()> {
    let needle = prompt.text(&format!("Texto a buscar ({label}): "))?;
    let found = library.find_books(field, &needle);
    if found.is_empty() {
        writeln!(prompt.out(), "No se encontraron libros por {label}.")?;
        return Ok(());
    }
    for book in found {
        writeln!(prompt.out(), "{book}")?;
    }
    Ok(())
}

fn held_by<R: BufRead, W: Write>(
    library: &Library,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let id = prompt.text("ID del usuario: ")?;
    match library.books_held_by(&id) {
        Ok(books) if books.is_empty() => {
            writeln!(prompt.out(), "El usuario no tiene libros prestados.")?
        }
        Ok(books) => {
            writeln!(prompt.out(), "Libros prestados al usuario {id}:")?;
            for book in books {
                writeln!(prompt.out(), "{book}")?;
            }
        }
        Err(e) => failure(prompt.out(), &lending_message(&e))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tally_store::{InMemoryChangeLog, InMemorySnapshot, RecordStore};

    use super::*;

    struct Session {
        output: String,
        log: InMemoryChangeLog,
    }

    fn session(limit: usize, script: &str) -> Session {
        let log = InMemoryChangeLog::new();
        let (books, _) = RecordStore::open(InMemorySnapshot::new(), log.clone());
        let (members, _) = RecordStore::open(InMemorySnapshot::new(), log.clone());
        let library = Library::new(books, members, limit);
        let mut prompt = Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        run(library, &mut prompt).unwrap();
        Session {
            output: String::from_utf8(prompt.into_output()).unwrap(),
            log,
        }
    }

    const SETUP: &str = concat!(
        "1\n111\nRayuela\nCortázar\nNovela\n",
        "1\n222\nFicciones\nBorges\nCuentos\n",
        "6\nu1\nAna\n",
    );

    #[test]
    fn borrow_and_give_back() {
        let script = format!("{SETUP}3\n111\nu1\n12\nu1\n2\n4\n111\nu1\n13\n");
        let s = session(3, &script);

        assert!(s.output.contains("Libro prestado exitosamente."));
        assert!(s.output.contains("Libros prestados al usuario u1:"));
        assert!(s.output.contains("Libro: Rayuela por Cortázar [Novela] (111) - Prestado"));
        assert!(s.output.contains("Libro devuelto exitosamente."));
        assert!(s.output.contains("¡Gracias por usar el Sistema de Gestión de Biblioteca!"));

        let lines = s.log.lines();
        assert_eq!(lines[0], "Libro agregado: ID=111, Titulo=Rayuela, Autor=Cortázar");
        assert_eq!(lines[2], "Usuario agregado: ID=u1, Nombre=Ana");
        assert!(lines.contains(&"Usuario actualizado: ID=u1, Libros=[111]→[]".to_string()));
    }

    #[test]
    fn loan_limit_is_reported() {
        let script = format!("{SETUP}3\n111\nu1\n3\n222\nu1\n13\n");
        let s = session(1, &script);
        assert!(s.output.contains("ya tiene el máximo de libros prestados (1)"));
    }

    #[test]
    fn rejections_are_printed() {
        let script = format!(
            "{SETUP}3\n111\nnadie\n3\n999\nu1\n3\n111\nu1\n5\n111\n8\nu1\n4\n222\nu1\n13\n"
        );
        let s = session(3, &script);
        assert!(s.output.contains("El usuario nadie no está registrado."));
        assert!(s.output.contains("No existe ningún libro con ISBN 999."));
        assert!(s.output.contains("El libro 111 está prestado y no se puede eliminar."));
        assert!(s.output.contains("aún tiene 1 libro(s) prestado(s)"));
        assert!(s.output.contains("El usuario u1 no tiene prestado el libro 222."));
    }

    #[test]
    fn duplicates_are_caught_up_front() {
        let script = format!("{SETUP}1\n111\n6\nu1\n13\n");
        let s = session(3, &script);
        assert!(s.output.contains("Ya existe un libro con ese ISBN."));
        assert!(s.output.contains("Ya existe un usuario con ese ID."));
        assert_eq!(s.log.lines().len(), 3);
    }

    #[test]
    fn searches_and_listings() {
        let script = format!("{SETUP}9\nrayu\n10\nBORGES\n11\npoesía\n7\n13\n");
        let s = session(3, &script);
        assert!(s.output.contains("Libro: Rayuela por Cortázar [Novela] (111) - Disponible"));
        assert!(s.output.contains("Libro: Ficciones por Borges [Cuentos] (222) - Disponible"));
        assert!(s.output.contains("No se encontraron libros por categoría."));
        assert!(s.output.contains("ID: u1, Nombre: Ana, Libros prestados: []"));
    }

    #[test]
    fn empty_library_and_removals() {
        let s = session(3, "2\n7\n1\n1\nT\nA\nC\n5\n1\n6\nx\nX\n8\nx\n13\n");
        assert!(s.output.contains("No hay libros en la biblioteca."));
        assert!(s.output.contains("No hay usuarios registrados."));
        assert!(s.output.contains("Libro 'T' quitado de la biblioteca."));
        assert!(s.output.contains("Usuario 'X' dado de baja."));
        assert_eq!(s.log.lines().len(), 4);
    }

    #[test]
    fn end_of_input_exits() {
        let s = session(3, "6\nu9\n");
        assert!(s.output.contains("Guardando biblioteca..."));
        assert!(s.log.lines().is_empty());
    }
}
