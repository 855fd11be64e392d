//! Plain-text summary of a cell layout

use minijinja::{context, Environment};

use crate::cell::CellLayout;
use crate::error::RenderError;
use crate::params::LatticeParams;

const REPORT_TEMPLATE: &str = r##"{{ name }}
Generated: {{ timestamp }}
{{ rule }}

Cell angles (deg)
  theta_c  = {{ theta_c }}
  theta_ld = {{ theta_ld }}
  theta_d  = {{ theta_d }}
  theta_sd = {{ theta_sd }}
  theta_f  = {{ theta_f }}
  sum LD D SD F SD D LD = {{ "%.4f"|format(total) }}{% if not closed %}  (does not match theta_c){% endif %}

Magnets (deg)
{% for line in magnets %}  {{ line }}
{% endfor %}
Fields
  B0_d = {{ b0_d }} T, k_d = {{ k_d }}
  B0_f = {{ b0_f }} T, k_f = {{ k_f }}

Radii (cm)
  r0 = {{ r0 }}, r_min = {{ r_min }}, r_max = {{ r_max }}
  cells modelled: {{ n_cell }}
"##;

/// Render the layout summary shown in place of an interactive window
pub fn layout_report(params: &LatticeParams, layout: &CellLayout) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.add_template("report", REPORT_TEMPLATE)?;
    let template = env.get_template("report")?;

    let magnets: Vec<String> = ["D1", "F", "D2"]
        .iter()
        .zip(layout.magnets())
        .map(|(name, m)| format!("{:<8} {:>7.2} -> {:>7.2}", name, m.start, m.end))
        .collect();

    let angles = &layout.angles;
    let output = template.render(context! {
        name => params.name,
        rule => "=".repeat(params.name.chars().count()),
        timestamp => chrono::Utc::now().to_rfc3339(),
        theta_c => angles.theta_c,
        theta_ld => angles.theta_ld,
        theta_d => angles.theta_d,
        theta_sd => angles.theta_sd,
        theta_f => angles.theta_f,
        total => angles.total(),
        closed => angles.check().is_ok(),
        magnets => magnets,
        b0_d => params.b0_d,
        b0_f => params.b0_f,
        k_d => params.k_d,
        k_f => params.k_f,
        r0 => params.r0,
        r_min => params.r_min,
        r_max => params.r_max,
        n_cell => params.n_cell,
    })?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::default_params;

    #[test]
    fn test_report_lists_layout() {
        let params = default_params();
        let layout = CellLayout::new(params.angles());
        let report = layout_report(&params, &layout).unwrap();

        assert!(report.starts_with("Default KURRI Cell\nGenerated: "));
        assert!(report.contains("\n==================\n"));
        assert!(report.contains("theta_ld = 4.75"));
        assert!(report.contains("sum LD D SD F SD D LD = 30.0000\n"));
        assert!(report.contains("  D1          4.75 ->    8.18\n"));
        assert!(report.contains("  F           9.88 ->   20.12\n"));
        assert!(report.contains("  D2         21.82 ->   25.25\n"));
        assert!(report.contains("B0_d = -1.6 T"));
    }

    #[test]
    fn test_report_flags_open_cell() {
        let mut params = default_params();
        params.theta_ld = 5.0;
        let layout = CellLayout::new(params.angles());
        let report = layout_report(&params, &layout).unwrap();
        assert!(report.contains("(does not match theta_c)"));
    }
}
