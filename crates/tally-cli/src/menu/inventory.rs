//! The inventory manager menu.

use std::io::{BufRead, Write};

use tally_inventory::{Inventory, Product, ProductField, ProductPatch, StockSummary};
use tally_store::{Listing, Update};

use super::{failure, report_durability, store_message, success, Flow};
use crate::prompt::{is_end_of_input, Prompter};

const MENU: &str = "
--- Sistema de Gestión de Inventarios ---
1. Añadir producto
2. Eliminar producto
3. Actualizar producto
4. Buscar producto por nombre
5. Mostrar todos los productos
6. Salir";

/// Run the menu until the user exits or input ends, then flush the store.
pub fn run<R: BufRead, W: Write>(
    mut inventory: Inventory,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    loop {
        writeln!(prompt.out(), "{MENU}")?;
        match handle(&mut inventory, prompt) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) if is_end_of_input(&e) => break,
            Err(e) => failure(prompt.out(), &format!("Error inesperado: {e}"))?,
        }
    }

    writeln!(prompt.out(), "Guardando inventario...")?;
    if let Err(e) = inventory.close() {
        failure(prompt.out(), &store_message(&e))?;
    }
    writeln!(
        prompt.out(),
        "¡Gracias por usar el Sistema de Gestión de Inventarios!"
    )?;
    Ok(())
}

fn handle<R: BufRead, W: Write>(
    inventory: &mut Inventory,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<Flow> {
    let choice = prompt.line("Seleccione una opción: ")?;
    match choice.as_str() {
        "1" => add(inventory, prompt)?,
        "2" => remove(inventory, prompt)?,
        "3" => update(inventory, prompt)?,
        "4" => search(inventory, prompt)?,
        "5" => list(inventory, prompt)?,
        "6" => return Ok(Flow::Exit),
        _ => writeln!(prompt.out(), "Opción no válida. Intente de nuevo.")?,
    }
    Ok(Flow::Continue)
}

fn add<R: BufRead, W: Write>(
    inventory: &mut Inventory,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let id: u32 = prompt.integer("Ingrese el ID del producto: ")?;
    if inventory.contains(&id) {
        failure(prompt.out(), "Ya existe un producto con ese ID.")?;
        return Ok(());
    }
    let name = prompt.text("Ingrese el nombre del producto: ")?;
    let quantity: u32 = prompt.integer("Ingrese la cantidad: ")?;
    let price = prompt.decimal("Ingrese el precio: ")?;

    match inventory.insert(Product::new(id, name, quantity, price)) {
        Ok(durability) => {
            success(prompt.out(), "Producto añadido exitosamente.")?;
            report_durability(prompt.out(), &durability)?;
        }
        Err(e) => failure(prompt.out(), &store_message(&e))?,
    }
    Ok(())
}

fn remove<R: BufRead, W: Write>(
    inventory: &mut Inventory,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let id: u32 = prompt.integer("Ingrese el ID del producto a eliminar: ")?;
    match inventory.remove(&id) {
        Ok((product, durability)) => {
            success(
                prompt.out(),
                &format!("Producto '{}' eliminado exitosamente.", product.name),
            )?;
            report_durability(prompt.out(), &durability)?;
        }
        Err(e) => failure(prompt.out(), &store_message(&e))?,
    }
    Ok(())
}

fn update<R: BufRead, W: Write>(
    inventory: &mut Inventory,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let id: u32 = prompt.integer("Ingrese el ID del producto a actualizar: ")?;
    let Some(current) = inventory.get(&id) else {
        failure(prompt.out(), "Producto no encontrado.")?;
        return Ok(());
    };
    writeln!(prompt.out(), "Producto actual:\n{current}")?;

    let patch = ProductPatch {
        quantity: prompt
            .optional_integer("Nueva cantidad (deje en blanco para no cambiar): ")?,
        price: prompt.optional_decimal("Nuevo precio (deje en blanco para no cambiar): ")?,
    };

    match inventory.update(&id, &patch) {
        Ok(Update::Changed {
            changes,
            durability,
        }) => {
            let listed: Vec<String> = changes.iter().map(ToString::to_string).collect();
            success(
                prompt.out(),
                &format!("Producto actualizado: {}", listed.join(", ")),
            )?;
            report_durability(prompt.out(), &durability)?;
        }
        Ok(Update::Unchanged) => writeln!(prompt.out(), "No se realizaron cambios.")?,
        Err(e) => failure(prompt.out(), &store_message(&e))?,
    }
    Ok(())
}

fn search<R: BufRead, W: Write>(
    inventory: &Inventory,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    let needle = prompt.text("Ingrese el nombre del producto a buscar: ")?;
    let found = inventory.find_by(ProductField::Name, &needle);
    if found.is_empty() {
        writeln!(prompt.out(), "No se encontraron productos con ese nombre.")?;
        return Ok(());
    }
    writeln!(prompt.out(), "Productos encontrados:")?;
    for product in found {
        writeln!(prompt.out(), "\n{product}")?;
    }
    Ok(())
}

fn list<R: BufRead, W: Write>(
    inventory: &Inventory,
    prompt: &mut Prompter<R, W>,
) -> anyhow::Result<()> {
    match inventory.list_all() {
        Listing::Empty => writeln!(prompt.out(), "El inventario está vacío.")?,
        Listing::Records(products) => {
            writeln!(prompt.out(), "Stock del inventario actual:")?;
            for product in products {
                writeln!(prompt.out(), "\n{product}")?;
            }
            let summary = StockSummary::of(products);
            writeln!(
                prompt.out(),
                "\nTotal: {} producto(s), {} unidad(es), {} agotado(s), valor ${:.2}",
                summary.products,
                summary.units,
                summary.sold_out,
                summary.value
            )?;
        }
    }
    Ok(())
}
