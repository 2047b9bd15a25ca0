use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

// Parámetros de paginación por query string.
// La paginación se aplica recién DESPUÉS de agregar en memoria (los cálculos
// de payouts agregan el período completo antes de cortar la página).
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageParams {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

// Corta una página de un conjunto ya agregado.
pub fn paginate<T>(mut items: Vec<T>, params: &PageParams) -> Paginated<T> {
    let total = items.len();
    let page = params.page();
    let page_size = params.page_size();

    let start = (page - 1).saturating_mul(page_size);
    let items = if start >= total {
        Vec::new()
    } else {
        items.drain(start..(start + page_size).min(total)).collect()
    };

    Paginated { items, total, page, page_size }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagina_por_defecto_y_limites() {
        let params = PageParams { page: None, page_size: None };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);

        let params = PageParams { page: Some(0), page_size: Some(10_000) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn corta_despues_de_agregar() {
        let items: Vec<i32> = (1..=45).collect();
        let page = paginate(items, &PageParams { page: Some(3), page_size: Some(20) });

        assert_eq!(page.total, 45);
        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
    }

    #[test]
    fn pagina_fuera_de_rango_devuelve_vacio() {
        let page = paginate(vec![1, 2, 3], &PageParams { page: Some(9), page_size: Some(20) });
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }
}
